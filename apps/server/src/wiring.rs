//! Assemble ports and services from settings.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use weave_action::ActionRegistry;
use weave_config::Settings;
use weave_ports::{
    CommandPublisher, HttpClientConfig, HttpCommandPublisher, HttpRegistryClient,
    InMemoryPublisher, RegistryClient, TracingActivityLogger,
};
use weave_runtime::{ActionDispatcher, ActionRunner, DispatchConfig, SelfRegistration};

/// Everything a command needs.
pub struct Services {
    pub registry: Arc<ActionRegistry>,
    pub registry_client: Arc<dyn RegistryClient>,
    pub runner: Arc<ActionRunner>,
    pub dispatcher: Arc<ActionDispatcher>,
    pub registration: SelfRegistration,
}

impl Services {
    pub fn from_settings(settings: &Settings, registry: ActionRegistry) -> anyhow::Result<Self> {
        let registry = Arc::new(registry);
        let mut registry_http = HttpClientConfig::new(&settings.registry.base_url)
            .context("registry.base_url")?
            .with_timeout(Duration::from_secs(settings.registry.timeout_secs));
        if let Some(key) = &settings.registry.api_key {
            registry_http = registry_http.with_api_key(key.clone());
        }
        let registry_client: Arc<dyn RegistryClient> =
            Arc::new(HttpRegistryClient::new(registry_http).context("building registry client")?);

        let publisher: Arc<dyn CommandPublisher> = match &settings.bus.base_url {
            Some(base_url) => {
                let mut bus_http = HttpClientConfig::new(base_url)
                    .context("bus.base_url")?
                    .with_timeout(Duration::from_secs(settings.bus.timeout_secs));
                if let Some(key) = &settings.bus.api_key {
                    bus_http = bus_http.with_api_key(key.clone());
                }
                Arc::new(HttpCommandPublisher::new(bus_http).context("building bus client")?)
            }
            // Validation guarantees dispatch is synchronous here.
            None => Arc::new(InMemoryPublisher::new()),
        };

        let runner = Arc::new(ActionRunner::new(
            Arc::clone(&registry),
            Arc::clone(&registry_client),
            Arc::new(TracingActivityLogger),
        ));
        let dispatcher = ActionDispatcher::new(
            Arc::clone(&registry),
            Arc::clone(&runner),
            publisher,
            DispatchConfig {
                always_sync: settings.dispatch.always_sync,
                command_topic: settings.dispatch.command_topic.clone(),
            },
        );

        let mut registration = SelfRegistration::new(Arc::clone(&registry));
        if let Some(slug) = &settings.integration.type_slug {
            registration = registration.with_default_type_slug(slug.clone());
        }

        Ok(Self {
            registry,
            registry_client,
            runner,
            dispatcher,
            registration,
        })
    }
}
