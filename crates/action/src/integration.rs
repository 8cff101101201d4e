use serde::{Deserialize, Serialize};

use crate::config::ConfigMap;
use crate::id::{ActionId, IntegrationId};

/// A configured integration as returned by the integration registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationRecord {
    /// Registry-assigned identifier.
    pub id: IntegrationId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Base URL of the remote system this integration talks to.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Integration type slug.
    #[serde(rename = "type", default)]
    pub type_slug: Option<String>,
    /// Disabled integrations still execute; the flag is informational here.
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    /// Stored per-action configuration.
    #[serde(default)]
    pub configurations: Vec<StoredActionConfig>,
}

const fn enabled_default() -> bool {
    true
}

/// Stored base configuration of one action for one integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredActionConfig {
    /// Action the configuration belongs to.
    pub action: ActionId,
    /// Field values.
    #[serde(default)]
    pub data: ConfigMap,
}

impl IntegrationRecord {
    /// Create an enabled record with no stored configurations.
    pub fn new(id: impl Into<IntegrationId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            base_url: None,
            type_slug: None,
            enabled: true,
            configurations: Vec::new(),
        }
    }

    /// Attach a stored configuration for `action`.
    pub fn with_configuration(mut self, action: impl Into<ActionId>, data: ConfigMap) -> Self {
        self.configurations.push(StoredActionConfig {
            action: action.into(),
            data,
        });
        self
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Stored configuration of `action`, if any. The first entry wins.
    pub fn configuration_for(&self, action: &ActionId) -> Option<&ConfigMap> {
        self.configurations
            .iter()
            .find(|c| &c.action == action)
            .map(|c| &c.data)
    }
}
