//! Activity log port.
//!
//! Records the lifecycle of each execution so operators can see what ran,
//! with which overrides, and how it ended.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use weave_action::{ActionId, ConfigMap, IntegrationId};

use crate::error::PortsError;

/// Lifecycle stage of an execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ActivityKind {
    /// Handler is about to run.
    ActionStarted,
    /// Handler returned a result.
    ActionCompleted {
        /// Handler result.
        result: serde_json::Value,
    },
    /// Handler returned an error.
    ActionFailed {
        /// Error text.
        error: String,
    },
}

/// One activity log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// Integration the action ran against.
    pub integration_id: IntegrationId,
    /// Action that ran.
    pub action_id: ActionId,
    /// Overrides in effect for this execution.
    pub config_overrides: ConfigMap,
    /// When the event happened.
    pub at: DateTime<Utc>,
    /// Stage.
    #[serde(flatten)]
    pub kind: ActivityKind,
}

impl ActivityEvent {
    /// Create an event stamped with the current time.
    pub fn now(
        integration_id: IntegrationId,
        action_id: ActionId,
        config_overrides: ConfigMap,
        kind: ActivityKind,
    ) -> Self {
        Self {
            integration_id,
            action_id,
            config_overrides,
            at: Utc::now(),
            kind,
        }
    }
}

/// Sink for activity events.
#[async_trait]
pub trait ActivityLogger: Send + Sync {
    /// Record an event.
    async fn record(&self, event: ActivityEvent) -> Result<(), PortsError>;
}

/// [`ActivityLogger`] that only writes `tracing` records.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingActivityLogger;

#[async_trait]
impl ActivityLogger for TracingActivityLogger {
    async fn record(&self, event: ActivityEvent) -> Result<(), PortsError> {
        let integration_id = event.integration_id.as_str();
        let action_id = event.action_id.as_str();
        match &event.kind {
            ActivityKind::ActionStarted => {
                tracing::info!(integration_id, action_id, "action started");
            }
            ActivityKind::ActionCompleted { .. } => {
                tracing::info!(integration_id, action_id, "action completed");
            }
            ActivityKind::ActionFailed { error } => {
                tracing::warn!(integration_id, action_id, error = %error, "action failed");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn kind_is_flattened_into_event() {
        let event = ActivityEvent {
            integration_id: IntegrationId::new("i-1"),
            action_id: ActionId::new("pull_observations"),
            config_overrides: ConfigMap::new(),
            at: DateTime::parse_from_rfc3339("2024-12-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            kind: ActivityKind::ActionFailed {
                error: "fatal: bad token".into(),
            },
        };

        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "integration_id": "i-1",
                "action_id": "pull_observations",
                "config_overrides": {},
                "at": "2024-12-01T00:00:00Z",
                "event": "action_failed",
                "error": "fatal: bad token"
            })
        );
    }

    #[tokio::test]
    async fn tracing_logger_never_fails() {
        let event = ActivityEvent::now(
            IntegrationId::new("i-1"),
            ActionId::new("auth"),
            ConfigMap::new(),
            ActivityKind::ActionStarted,
        );
        assert!(TracingActivityLogger.record(event).await.is_ok());
    }
}
