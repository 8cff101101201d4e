//! Triggering further actions from inside a handler.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::{ConfigMap, ResolvedActionConfig};
use crate::error::ActionError;
use crate::id::IntegrationId;

/// Configuration handed to a trigger.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerConfig {
    /// A configuration already resolved for the action.
    Resolved(ResolvedActionConfig),
    /// Raw caller overrides.
    Overrides(ConfigMap),
}

impl From<ConfigMap> for TriggerConfig {
    fn from(overrides: ConfigMap) -> Self {
        Self::Overrides(overrides)
    }
}

impl From<ResolvedActionConfig> for TriggerConfig {
    fn from(config: ResolvedActionConfig) -> Self {
        Self::Resolved(config)
    }
}

/// What a trigger did.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The handler ran in-process and returned this result.
    Executed(Value),
    /// A run-command was accepted by the bus.
    Published {
        /// Topic it went to.
        topic: String,
        /// Bus-assigned message id.
        message_id: String,
    },
}

/// Entry point for starting another action, either in-process or through
/// the command bus.
///
/// The runner attaches one to every [`ActionContext`](crate::ActionContext)
/// when a dispatcher exists, so handlers can fan out sub-actions.
#[async_trait]
pub trait ActionTrigger: Send + Sync + fmt::Debug {
    /// Trigger `action_id` for `integration_id`.
    async fn trigger(
        &self,
        integration_id: &IntegrationId,
        action_id: &str,
        config: TriggerConfig,
    ) -> Result<DispatchOutcome, ActionError>;
}
