//! Self-registration of the integration type with the remote registry.

use std::sync::Arc;

use weave_action::{ActionRegistry, humanize};
use weave_ports::{ActionRegistration, IntegrationTypeRegistration, RegistryClient};
use weave_resilience::{RetryPolicy, retry};

use crate::error::RuntimeError;

/// Trim and lowercase a slug. Blank slugs are `None`.
pub fn normalize_slug(slug: &str) -> Option<String> {
    let slug = slug.trim();
    (!slug.is_empty()).then(|| slug.to_lowercase())
}

/// Pushes this service's integration type and actions to the registry.
///
/// Transport failures are retried under [`RetryPolicy`] (3 attempts, 1s
/// initial backoff by default); any other registry error fails at once.
#[derive(Debug, Clone)]
pub struct SelfRegistration {
    registry: Arc<ActionRegistry>,
    default_type_slug: Option<String>,
    retry_policy: RetryPolicy,
}

impl SelfRegistration {
    /// Registration of every action in `registry`.
    pub fn new(registry: Arc<ActionRegistry>) -> Self {
        Self {
            registry,
            default_type_slug: None,
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Slug used when `register` is called without one.
    pub fn with_default_type_slug(mut self, slug: impl Into<String>) -> Self {
        self.default_type_slug = Some(slug.into());
        self
    }

    /// Override the retry policy.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    fn resolve_slug(&self, type_slug: Option<&str>) -> Result<String, RuntimeError> {
        type_slug
            .and_then(normalize_slug)
            .or_else(|| self.default_type_slug.as_deref().and_then(normalize_slug))
            .ok_or_else(|| RuntimeError::Configuration("integration type slug is not set".into()))
    }

    /// Build the registration payload for `type_slug`.
    pub fn build_payload(
        &self,
        type_slug: &str,
        service_url: Option<&str>,
    ) -> IntegrationTypeRegistration {
        let name = humanize(type_slug);
        let actions = self
            .registry
            .entries()
            .into_iter()
            .map(|entry| ActionRegistration {
                action_type: entry.action_type,
                description: format!("{name} {} action", entry.name),
                name: entry.name,
                value: entry.action_id.into_inner(),
                schema: entry.schema,
                is_periodic_action: entry.is_periodic,
            })
            .collect();

        IntegrationTypeRegistration {
            description: format!("Default type for integrations with {name}"),
            name,
            value: type_slug.to_owned(),
            service_url: service_url.map(str::to_owned),
            actions,
        }
    }

    /// Register with the remote registry and return its response unchanged.
    pub async fn register(
        &self,
        client: &dyn RegistryClient,
        type_slug: Option<&str>,
        service_url: Option<&str>,
    ) -> Result<serde_json::Value, RuntimeError> {
        let slug = self.resolve_slug(type_slug)?;
        tracing::info!(
            type_slug = %slug,
            actions = self.registry.len(),
            "registering integration type"
        );

        let result = retry(
            &self.retry_policy,
            |err: &weave_ports::PortsError| err.is_retryable(),
            |attempt| {
                let payload = self.build_payload(&slug, service_url);
                tracing::debug!(type_slug = %slug, attempt, "sending registration");
                async move { client.register_integration_type(&payload).await }
            },
        )
        .await;

        match result {
            Ok(response) => {
                tracing::info!(type_slug = %slug, "integration type registered");
                Ok(response)
            }
            Err(failure) => {
                tracing::error!(
                    type_slug = %slug,
                    attempts = failure.attempts,
                    error = %failure.error,
                    "integration type registration failed"
                );
                Err(RuntimeError::from_registry(failure.error, failure.attempts))
            }
        }
    }
}
