//! Command bus port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use weave_action::{ActionId, ConfigMap, IntegrationId};

use crate::error::PortsError;

/// Request to run one action for one integration.
///
/// Immutable once built; the override mapping is carried exactly as the
/// caller supplied it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunActionCommand {
    integration_id: IntegrationId,
    action_id: ActionId,
    #[serde(default)]
    config_overrides: ConfigMap,
}

impl RunActionCommand {
    /// Create a command.
    pub fn new(
        integration_id: impl Into<IntegrationId>,
        action_id: impl Into<ActionId>,
        config_overrides: ConfigMap,
    ) -> Self {
        Self {
            integration_id: integration_id.into(),
            action_id: action_id.into(),
            config_overrides,
        }
    }

    /// Target integration.
    pub fn integration_id(&self) -> &IntegrationId {
        &self.integration_id
    }

    /// Action to run.
    pub fn action_id(&self) -> &ActionId {
        &self.action_id
    }

    /// Caller overrides.
    pub fn config_overrides(&self) -> &ConfigMap {
        &self.config_overrides
    }
}

/// Acknowledgement from the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishAck {
    /// Bus-assigned message id.
    pub message_id: String,
}

/// Publishes run-commands to a topic for asynchronous execution.
///
/// Delivery is at-least-once; consumers must tolerate duplicates.
#[async_trait]
pub trait CommandPublisher: Send + Sync {
    /// Publish `command` to `topic`, returning once the bus has accepted it.
    async fn publish(
        &self,
        command: &RunActionCommand,
        topic: &str,
    ) -> Result<PublishAck, PortsError>;
}
