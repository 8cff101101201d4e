use std::fmt;
use std::sync::Arc;

use crate::error::ActionError;
use crate::id::ActionId;
use crate::integration::IntegrationRecord;
use crate::trigger::{ActionTrigger, DispatchOutcome, TriggerConfig};

/// How an execution was started.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TriggerSource {
    /// Direct HTTP execute request.
    Direct,
    /// Message delivered by the command bus.
    Message {
        /// Bus-assigned message id.
        message_id: String,
    },
    /// In-process dispatch with synchronous execution.
    Inline,
}

impl fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => f.write_str("direct"),
            Self::Message { message_id } => write!(f, "message:{message_id}"),
            Self::Inline => f.write_str("inline"),
        }
    }
}

/// Context handed to a handler for one execution.
///
/// Built by the runner after the integration has been fetched from the
/// registry. Handlers read connection details from [`integration`](Self::integration).
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ActionContext {
    /// Integration the action runs against.
    pub integration: IntegrationRecord,
    /// Action being executed.
    pub action_id: ActionId,
    /// Origin of the execution.
    pub trigger: TriggerSource,
    /// Dispatcher for sub-actions, when the service has one.
    pub dispatcher: Option<Arc<dyn ActionTrigger>>,
}

impl ActionContext {
    /// Create a new context.
    pub fn new(integration: IntegrationRecord, action_id: ActionId, trigger: TriggerSource) -> Self {
        Self {
            integration,
            action_id,
            trigger,
            dispatcher: None,
        }
    }

    /// Attach the dispatcher handlers use for sub-actions.
    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn ActionTrigger>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Trigger another action for the same integration.
    ///
    /// Fails with a fatal error when no dispatcher is attached.
    pub async fn trigger_action(
        &self,
        action_id: &str,
        config: impl Into<TriggerConfig> + Send,
    ) -> Result<DispatchOutcome, ActionError> {
        let Some(dispatcher) = &self.dispatcher else {
            return Err(ActionError::fatal(format!(
                "cannot trigger `{action_id}`: no dispatcher attached"
            )));
        };
        dispatcher
            .trigger(&self.integration.id, action_id, config.into())
            .await
    }
}
