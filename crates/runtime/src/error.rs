//! Runtime error types.

use weave_action::{ActionError, ActionId, ConfigValidationError, IntegrationId, RegistryError};
use weave_ports::{EnvelopeError, PortsError};

/// Errors from registration, dispatch and execution.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Required static configuration is missing.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Action id not present in the registry.
    #[error("unknown action `{0}`")]
    UnknownAction(ActionId),

    /// The registry has no such integration.
    #[error("unknown integration `{0}`")]
    UnknownIntegration(IntegrationId),

    /// Overrides or merged configuration failed schema validation.
    #[error(transparent)]
    ConfigValidation(#[from] ConfigValidationError),

    /// Transport failure talking to the registry, after retries.
    #[error("registry unreachable after {attempts} attempt(s): {source}")]
    RegistryTransport {
        /// Attempts made.
        attempts: u32,
        /// Last transport error.
        #[source]
        source: PortsError,
    },

    /// The registry answered with a non-transport failure.
    #[error("registry error: {0}")]
    Registry(#[source] PortsError),

    /// The command bus did not accept the command.
    #[error("failed to publish to topic `{topic}`: {source}")]
    Publish {
        /// Target topic.
        topic: String,
        /// Bus error.
        #[source]
        source: PortsError,
    },

    /// The action's own logic failed.
    #[error("action `{action_id}` failed: {source}")]
    HandlerExecution {
        /// Action that failed.
        action_id: ActionId,
        /// Handler error.
        #[source]
        source: ActionError,
    },

    /// A message delivery could not be decoded.
    #[error("invalid envelope: {0}")]
    Envelope(#[from] EnvelopeError),
}

impl RuntimeError {
    /// Classify a registry call failure. `attempts` is how many calls were made.
    pub fn from_registry(err: PortsError, attempts: u32) -> Self {
        if err.is_retryable() {
            Self::RegistryTransport {
                attempts,
                source: err,
            }
        } else {
            Self::Registry(err)
        }
    }

    /// Caused by the request itself rather than by this service or its
    /// collaborators.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownAction(_)
                | Self::UnknownIntegration(_)
                | Self::ConfigValidation(_)
                | Self::Envelope(_)
        )
    }

    /// Repeating the same request cannot succeed.
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Configuration(_) => true,
            Self::HandlerExecution { source, .. } => source.is_fatal(),
            other => other.is_client_error(),
        }
    }

    /// Whether the failure came from a retryable cause.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RegistryTransport { .. } => true,
            Self::Publish { source, .. } => source.is_retryable(),
            Self::HandlerExecution { source, .. } => source.is_retryable(),
            _ => false,
        }
    }
}

impl From<RegistryError> for RuntimeError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownAction(id) => Self::UnknownAction(id),
            other => Self::Configuration(other.to_string()),
        }
    }
}

/// Surface a sub-action failure to the handler that triggered it.
impl From<RuntimeError> for ActionError {
    fn from(err: RuntimeError) -> Self {
        match err {
            RuntimeError::HandlerExecution { source, .. } => source,
            other if other.is_client_error() => Self::validation(other.to_string()),
            other if other.is_retryable() => Self::retryable(other.to_string()),
            other => Self::fatal(other.to_string()),
        }
    }
}
