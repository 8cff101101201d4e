//! Error types for port operations.
//!
//! Every port method returns `Result<_, PortsError>`. Drivers map their
//! transport errors into these variants so callers can decide whether to
//! retry without inspecting messages.

use std::time::Duration;

use weave_resilience::Retryable;

/// Error type for all port operations.
///
/// Transport-class failures ([`Connection`](Self::Connection),
/// [`Timeout`](Self::Timeout), [`Upstream`](Self::Upstream)) are retryable;
/// everything else is permanent.
#[derive(Debug, thiserror::Error)]
pub enum PortsError {
    /// Entity not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity (e.g. "Integration").
        entity: String,
        /// Identifier that was looked up.
        id: String,
    },

    /// The remote service refused our credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The remote service rejected the request (4xx other than auth / 404).
    #[error("rejected with status {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// Could not reach the remote service.
    #[error("connection error: {0}")]
    Connection(String),

    /// Operation exceeded its timeout.
    #[error("timeout: {operation} after {duration:?}")]
    Timeout {
        /// Name of the operation that timed out.
        operation: String,
        /// Configured timeout.
        duration: Duration,
    },

    /// The remote service failed (5xx).
    #[error("upstream error: status {status}")]
    Upstream {
        /// HTTP status code.
        status: u16,
    },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Catch-all internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PortsError {
    /// Convenience constructor for [`PortsError::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Convenience constructor for [`PortsError::Rejected`].
    pub fn rejected(status: u16, body: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            body: body.into(),
        }
    }

    /// Convenience constructor for [`PortsError::Timeout`].
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Returns `true` for transport-class errors worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Timeout { .. } | Self::Upstream { .. }
        )
    }
}

impl Retryable for PortsError {
    fn is_retryable(&self) -> bool {
        Self::is_retryable(self)
    }
}

impl From<serde_json::Error> for PortsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(PortsError::Connection("refused".into()), true)]
    #[case(PortsError::timeout("get_integration_details", Duration::from_secs(10)), true)]
    #[case(PortsError::Upstream { status: 503 }, true)]
    #[case(PortsError::not_found("Integration", "i-1"), false)]
    #[case(PortsError::Unauthorized("bad token".into()), false)]
    #[case(PortsError::rejected(400, "bad payload"), false)]
    #[case(PortsError::Serialization("bad json".into()), false)]
    #[case(PortsError::Internal("oops".into()), false)]
    fn retryability(#[case] err: PortsError, #[case] retryable: bool) {
        assert_eq!(err.is_retryable(), retryable);
        assert_eq!(Retryable::is_retryable(&err), retryable);
    }

    #[test]
    fn from_serde_json_error() {
        let serde_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let ports_err: PortsError = serde_err.into();
        match &ports_err {
            PortsError::Serialization(msg) => assert!(!msg.is_empty()),
            other => panic!("expected Serialization, got {other:?}"),
        }
    }

    #[test]
    fn display() {
        assert_eq!(
            PortsError::not_found("Integration", "i-1").to_string(),
            "Integration not found: i-1"
        );
        assert_eq!(
            PortsError::rejected(422, "missing value").to_string(),
            "rejected with status 422: missing value"
        );
        assert_eq!(
            PortsError::Upstream { status: 502 }.to_string(),
            "upstream error: status 502"
        );
    }
}
