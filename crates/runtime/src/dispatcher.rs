//! Action dispatcher -- run now, or hand off to the command bus.

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use weave_action::{
    ActionError, ActionRegistry, ActionTrigger, ConfigValidationError, DispatchOutcome,
    IntegrationId, TriggerConfig, TriggerSource,
};
use weave_ports::{CommandPublisher, RunActionCommand};

use crate::error::RuntimeError;
use crate::runner::ActionRunner;

/// Dispatch settings, fixed at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Always execute in-process, even when a topic is configured.
    pub always_sync: bool,
    /// Topic for asynchronous run-commands.
    pub command_topic: Option<String>,
}

impl DispatchConfig {
    /// Asynchronous dispatch to `topic`.
    pub fn with_topic(topic: impl Into<String>) -> Self {
        Self {
            always_sync: false,
            command_topic: Some(topic.into()),
        }
    }

    /// Topic to publish to, or `None` when execution must be synchronous.
    pub fn publish_topic(&self) -> Option<&str> {
        if self.always_sync {
            return None;
        }
        self.command_topic.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// Decides per trigger whether to execute directly or publish a command.
///
/// Exactly one of the two happens for every successful call. The
/// dispatcher attaches itself to its runner, so handlers run by that runner
/// can trigger sub-actions through their context.
pub struct ActionDispatcher {
    registry: Arc<ActionRegistry>,
    runner: Arc<ActionRunner>,
    publisher: Arc<dyn CommandPublisher>,
    config: DispatchConfig,
}

impl ActionDispatcher {
    /// Create a dispatcher and attach it to `runner`.
    pub fn new(
        registry: Arc<ActionRegistry>,
        runner: Arc<ActionRunner>,
        publisher: Arc<dyn CommandPublisher>,
        config: DispatchConfig,
    ) -> Arc<Self> {
        let dispatcher = Arc::new(Self {
            registry,
            runner,
            publisher,
            config,
        });
        let weak: Weak<Self> = Arc::downgrade(&dispatcher);
        let trigger: Weak<dyn ActionTrigger> = weak;
        dispatcher.runner.attach_dispatcher(trigger);
        dispatcher
    }

    /// Dispatch settings.
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Trigger `action_id` for `integration_id`.
    ///
    /// Overrides are validated before anything else happens. A resolved
    /// configuration is re-validated as overrides, and must belong to
    /// `action_id`.
    pub async fn trigger_action(
        &self,
        integration_id: &IntegrationId,
        action_id: &str,
        config: impl Into<TriggerConfig>,
    ) -> Result<DispatchOutcome, RuntimeError> {
        let action = self.registry.get(action_id)?;
        let overrides = match config.into() {
            TriggerConfig::Overrides(overrides) => overrides,
            TriggerConfig::Resolved(resolved) => {
                if resolved.action_id() != action.id() {
                    return Err(ConfigValidationError::foreign(
                        action.id().clone(),
                        resolved.action_id().clone(),
                    )
                    .into());
                }
                resolved.into_values()
            }
        };
        action.validate_overrides(&overrides)?;

        let Some(topic) = self.config.publish_topic() else {
            tracing::debug!(
                integration_id = %integration_id,
                action_id = %action.id(),
                "executing action synchronously"
            );
            let result = self
                .runner
                .execute(integration_id, action_id, &overrides, TriggerSource::Inline)
                .await?;
            return Ok(DispatchOutcome::Executed(result));
        };

        let command = RunActionCommand::new(integration_id.clone(), action.id().clone(), overrides);
        let ack = self
            .publisher
            .publish(&command, topic)
            .await
            .map_err(|source| RuntimeError::Publish {
                topic: topic.to_owned(),
                source,
            })?;

        tracing::info!(
            integration_id = %integration_id,
            action_id = %action.id(),
            topic,
            message_id = %ack.message_id,
            "action command published"
        );
        Ok(DispatchOutcome::Published {
            topic: topic.to_owned(),
            message_id: ack.message_id,
        })
    }
}

#[async_trait]
impl ActionTrigger for ActionDispatcher {
    async fn trigger(
        &self,
        integration_id: &IntegrationId,
        action_id: &str,
        config: TriggerConfig,
    ) -> Result<DispatchOutcome, ActionError> {
        self.trigger_action(integration_id, action_id, config)
            .await
            .map_err(ActionError::from)
    }
}

impl std::fmt::Debug for ActionDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionDispatcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
