//! Integration registry port.
//!
//! The registry stores integration types (with their actions and schemas)
//! and configured integrations. The service pushes its own type at startup
//! and fetches integration details before every execution.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use weave_action::{ActionType, IntegrationId, IntegrationRecord};

use crate::error::PortsError;

/// Projection of one action inside an integration type registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRegistration {
    /// Classification on the wire (`"pull_data"`, ...).
    #[serde(rename = "type")]
    pub action_type: ActionType,
    /// Display name.
    pub name: String,
    /// Action id.
    pub value: String,
    /// Human description.
    pub description: String,
    /// JSON Schema of the action's configuration.
    pub schema: serde_json::Value,
    /// Whether the registry should schedule this action.
    pub is_periodic_action: bool,
}

/// Payload registering an integration type and all of its actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationTypeRegistration {
    /// Display name.
    pub name: String,
    /// Normalized slug.
    pub value: String,
    /// Human description.
    pub description: String,
    /// URL where this service receives direct triggers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
    /// Actions in registration order.
    pub actions: Vec<ActionRegistration>,
}

/// Client for the remote integration registry.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Create or update an integration type. Returns the registry's response body.
    async fn register_integration_type(
        &self,
        registration: &IntegrationTypeRegistration,
    ) -> Result<serde_json::Value, PortsError>;

    /// Fetch a configured integration with its stored action configurations.
    async fn get_integration_details(
        &self,
        integration_id: &IntegrationId,
    ) -> Result<IntegrationRecord, PortsError>;
}
