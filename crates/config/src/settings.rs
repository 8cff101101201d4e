//! Service settings

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ConfigError, ConfigResult};

/// Complete service settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Integration type this service implements.
    pub integration: IntegrationSettings,
    /// Dispatch mode.
    pub dispatch: DispatchSettings,
    /// Remote integration registry.
    pub registry: RegistrySettings,
    /// Message bus for asynchronous commands.
    pub bus: BusSettings,
    /// Inbound HTTP surface.
    pub server: ServerSettings,
    /// Logging.
    pub log: weave_log::Config,
}

/// `[integration]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationSettings {
    /// Integration type slug, e.g. `acme_tracker`.
    pub type_slug: Option<String>,
    /// Public URL of this service, sent with the registration.
    pub service_url: Option<String>,
}

/// `[dispatch]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchSettings {
    /// Execute every trigger in-process.
    pub always_sync: bool,
    /// Topic for asynchronous run-commands.
    pub command_topic: Option<String>,
}

impl DispatchSettings {
    /// Whether triggers are published rather than executed in-process.
    pub fn is_async(&self) -> bool {
        !self.always_sync
            && self
                .command_topic
                .as_deref()
                .is_some_and(|topic| !topic.trim().is_empty())
    }
}

/// `[registry]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    /// Base URL of the registry API.
    pub base_url: String,
    /// Bearer token.
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_owned(),
            api_key: None,
            timeout_secs: 10,
        }
    }
}

/// `[bus]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusSettings {
    /// Base URL of the publish API. Unset means no bus.
    pub base_url: Option<String>,
    /// Bearer token.
    pub api_key: Option<String>,
    /// Publish request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for BusSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeout_secs: 10,
        }
    }
}

/// `[server]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Listen address.
    pub bind: SocketAddr,
    /// Register the integration type before serving.
    pub register_on_startup: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            register_on_startup: true,
        }
    }
}

impl Settings {
    /// Check cross-field consistency.
    pub fn validate(&self) -> ConfigResult<()> {
        parse_url("registry.base_url", &self.registry.base_url)?;
        if self.registry.timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "registry.timeout_secs",
                "must be greater than zero",
            ));
        }
        if let Some(bus) = &self.bus.base_url {
            parse_url("bus.base_url", bus)?;
            if self.bus.timeout_secs == 0 {
                return Err(ConfigError::invalid("bus.timeout_secs", "must be greater than zero"));
            }
        }
        if let Some(url) = &self.integration.service_url {
            parse_url("integration.service_url", url)?;
        }
        if self.dispatch.is_async() && self.bus.base_url.is_none() {
            return Err(ConfigError::invalid(
                "dispatch.command_topic",
                "asynchronous dispatch requires bus.base_url",
            ));
        }
        Ok(())
    }
}

fn parse_url(key: &'static str, raw: &str) -> ConfigResult<Url> {
    Url::parse(raw).map_err(|e| ConfigError::invalid(key, format!("`{raw}`: {e}")))
}
