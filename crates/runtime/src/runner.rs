//! Action runner -- executes one action for one integration.
//!
//! Shared by direct HTTP triggers, bus deliveries and synchronous dispatch.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use serde_json::Value;
use weave_action::{
    ActionContext, ActionId, ActionRegistry, ActionTrigger, ConfigMap, IntegrationId,
    IntegrationRecord, TriggerSource,
};
use weave_ports::{
    ActivityEvent, ActivityKind, ActivityLogger, EventEnvelope, PortsError, RegistryClient,
    RunActionCommand,
};

use crate::error::RuntimeError;

/// Result of handling one bus delivery.
#[derive(Debug)]
pub enum DeliveryOutcome {
    /// The handler ran and succeeded.
    Completed(Value),
    /// The delivery can never succeed; acknowledge it so it is not redelivered.
    Dropped {
        /// Why it was dropped.
        reason: String,
    },
    /// Execution failed; leave redelivery to the bus.
    Failed(RuntimeError),
}

/// Resolves stored configuration, merges overrides, runs the handler and
/// reports the outcome to the activity log.
///
/// Unknown actions and invalid overrides are rejected before the registry
/// is contacted.
pub struct ActionRunner {
    registry: Arc<ActionRegistry>,
    registry_client: Arc<dyn RegistryClient>,
    activity: Arc<dyn ActivityLogger>,
    dispatcher: RwLock<Option<Weak<dyn ActionTrigger>>>,
}

impl ActionRunner {
    /// Create a runner.
    pub fn new(
        registry: Arc<ActionRegistry>,
        registry_client: Arc<dyn RegistryClient>,
        activity: Arc<dyn ActivityLogger>,
    ) -> Self {
        Self {
            registry,
            registry_client,
            activity,
            dispatcher: RwLock::new(None),
        }
    }

    /// Hand handler contexts a dispatcher for sub-actions.
    ///
    /// Held weakly; a later call replaces the previous dispatcher.
    pub fn attach_dispatcher(&self, dispatcher: Weak<dyn ActionTrigger>) {
        *self.dispatcher.write() = Some(dispatcher);
    }

    fn dispatcher(&self) -> Option<Arc<dyn ActionTrigger>> {
        self.dispatcher.read().as_ref().and_then(Weak::upgrade)
    }

    /// Access the action registry.
    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Execute `action_id` for `integration_id` with `overrides`.
    pub async fn execute(
        &self,
        integration_id: &IntegrationId,
        action_id: &str,
        overrides: &ConfigMap,
        trigger: TriggerSource,
    ) -> Result<Value, RuntimeError> {
        let action = self.registry.get(action_id)?;
        action.validate_overrides(overrides)?;

        let integration = self.fetch_integration(integration_id).await?;
        let config = action.resolve(integration.configuration_for(action.id()), overrides)?;

        tracing::info!(
            integration_id = %integration_id,
            action_id = %action.id(),
            trigger = %trigger,
            "executing action"
        );
        self.record(integration_id, action.id(), overrides, ActivityKind::ActionStarted)
            .await;

        let mut ctx = ActionContext::new(integration, action.id().clone(), trigger);
        if let Some(dispatcher) = self.dispatcher() {
            ctx = ctx.with_dispatcher(dispatcher);
        }
        match action.handler().execute(&ctx, &config).await {
            Ok(result) => {
                tracing::info!(
                    integration_id = %integration_id,
                    action_id = %action.id(),
                    "action completed"
                );
                self.record(
                    integration_id,
                    action.id(),
                    overrides,
                    ActivityKind::ActionCompleted {
                        result: result.clone(),
                    },
                )
                .await;
                Ok(result)
            }
            Err(err) => {
                tracing::error!(
                    integration_id = %integration_id,
                    action_id = %action.id(),
                    error = %err,
                    "action failed"
                );
                self.record(
                    integration_id,
                    action.id(),
                    overrides,
                    ActivityKind::ActionFailed {
                        error: err.to_string(),
                    },
                )
                .await;
                Err(RuntimeError::HandlerExecution {
                    action_id: action.id().clone(),
                    source: err,
                })
            }
        }
    }

    /// Execute a decoded run-command.
    pub async fn execute_command(
        &self,
        command: &RunActionCommand,
        trigger: TriggerSource,
    ) -> Result<Value, RuntimeError> {
        self.execute(
            command.integration_id(),
            command.action_id().as_str(),
            command.config_overrides(),
            trigger,
        )
        .await
    }

    /// Handle a parsed bus delivery.
    pub async fn handle_delivery(&self, envelope: &EventEnvelope) -> DeliveryOutcome {
        let command = match envelope.decode() {
            Ok(command) => command,
            Err(err) => return self.dropped(&RuntimeError::from(err)),
        };
        let trigger = TriggerSource::Message {
            message_id: envelope.message.message_id.clone(),
        };

        match self.execute_command(&command, trigger).await {
            Ok(result) => DeliveryOutcome::Completed(result),
            Err(err) if err.is_terminal() => self.dropped(&err),
            Err(err) => {
                tracing::error!(
                    integration_id = %command.integration_id(),
                    action_id = %command.action_id(),
                    message_id = %envelope.message.message_id,
                    error = %err,
                    "delivery failed"
                );
                DeliveryOutcome::Failed(err)
            }
        }
    }

    /// Handle a raw bus delivery body. Unparseable bodies are dropped.
    pub async fn handle_raw_delivery(&self, body: &[u8]) -> DeliveryOutcome {
        match EventEnvelope::from_slice(body) {
            Ok(envelope) => self.handle_delivery(&envelope).await,
            Err(err) => self.dropped(&RuntimeError::from(err)),
        }
    }

    fn dropped(&self, err: &RuntimeError) -> DeliveryOutcome {
        tracing::error!(error = %err, "dropping undeliverable message");
        DeliveryOutcome::Dropped {
            reason: err.to_string(),
        }
    }

    async fn fetch_integration(
        &self,
        integration_id: &IntegrationId,
    ) -> Result<IntegrationRecord, RuntimeError> {
        self.registry_client
            .get_integration_details(integration_id)
            .await
            .map_err(|err| match err {
                PortsError::NotFound { .. } => {
                    RuntimeError::UnknownIntegration(integration_id.clone())
                }
                other => RuntimeError::from_registry(other, 1),
            })
    }

    async fn record(
        &self,
        integration_id: &IntegrationId,
        action_id: &ActionId,
        overrides: &ConfigMap,
        kind: ActivityKind,
    ) {
        let event = ActivityEvent::now(
            integration_id.clone(),
            action_id.clone(),
            overrides.clone(),
            kind,
        );
        if let Err(err) = self.activity.record(event).await {
            tracing::warn!(
                integration_id = %integration_id,
                action_id = %action_id,
                error = %err,
                "failed to record activity"
            );
        }
    }
}

impl std::fmt::Debug for ActionRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRunner")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
