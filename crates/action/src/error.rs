use std::fmt;
use std::time::Duration;

use crate::id::ActionId;

/// Failure raised by an action handler.
///
/// Handlers decide whether a failure is worth retrying; the service itself
/// never retries a handler, it only records the outcome and surfaces it.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum ActionError {
    /// Transient failure; a redelivery of the same command may succeed.
    #[error("retryable: {error}")]
    Retryable {
        /// Human-readable error message.
        error: String,
        /// Suggested delay before a redelivery.
        backoff_hint: Option<Duration>,
    },

    /// Permanent failure.
    ///
    /// Invalid credentials, remote rejection, business logic errors.
    #[error("fatal: {error}")]
    Fatal {
        /// Human-readable error message.
        error: String,
        /// Optional structured details about the failure.
        details: Option<serde_json::Value>,
    },

    /// The resolved configuration was unusable for this handler.
    #[error("validation: {0}")]
    Validation(String),
}

impl ActionError {
    /// Create a retryable error with no backoff hint.
    pub fn retryable(msg: impl Into<String>) -> Self {
        Self::Retryable {
            error: msg.into(),
            backoff_hint: None,
        }
    }

    /// Create a retryable error with a suggested backoff duration.
    pub fn retryable_with_backoff(msg: impl Into<String>, backoff: Duration) -> Self {
        Self::Retryable {
            error: msg.into(),
            backoff_hint: Some(backoff),
        }
    }

    /// Create a fatal error.
    pub fn fatal(msg: impl Into<String>) -> Self {
        Self::Fatal {
            error: msg.into(),
            details: None,
        }
    }

    /// Create a fatal error with structured details.
    pub fn fatal_with_details(msg: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Fatal {
            error: msg.into(),
            details: Some(details),
        }
    }

    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Returns `true` if a redelivery may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable { .. })
    }

    /// Returns `true` if this error is permanent.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. } | Self::Validation(_))
    }

    /// Extract the backoff hint, if present.
    pub fn backoff_hint(&self) -> Option<Duration> {
        match self {
            Self::Retryable { backoff_hint, .. } => *backoff_hint,
            _ => None,
        }
    }
}

/// What is wrong with a single configuration field.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ViolationKind {
    /// The key is not declared by the schema.
    UnknownField,
    /// The value does not have the declared type.
    TypeMismatch {
        /// Declared type name.
        expected: String,
        /// JSON kind that was provided.
        found: String,
    },
    /// A required field has no value after merging.
    Missing,
    /// A numeric value lies outside `[minimum, maximum]`.
    OutOfRange,
    /// A string is shorter or longer than allowed.
    Length,
    /// The value is not one of the enumerated choices.
    NotAllowed,
    /// A resolved configuration belongs to another action.
    ForeignAction(ActionId),
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownField => f.write_str("unknown field"),
            Self::TypeMismatch { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            Self::Missing => f.write_str("required field is missing"),
            Self::OutOfRange => f.write_str("value out of range"),
            Self::Length => f.write_str("length out of bounds"),
            Self::NotAllowed => f.write_str("value not in allowed set"),
            Self::ForeignAction(other) => {
                write!(f, "configuration was resolved for action `{other}`")
            }
        }
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// Field key.
    pub field: String,
    /// Violation category.
    pub kind: ViolationKind,
}

impl FieldViolation {
    /// Create a violation for `field`.
    pub fn new(field: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "`{}`: {}", self.field, self.kind)
        }
    }
}

/// Configuration rejected against an action's schema.
///
/// Carries every violation found in one pass, never just the first.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid configuration for action `{action_id}`: {}", join_violations(.violations))]
pub struct ConfigValidationError {
    /// Action whose schema was violated.
    pub action_id: ActionId,
    /// All violations, in field declaration / input order.
    pub violations: Vec<FieldViolation>,
}

impl ConfigValidationError {
    /// A configuration resolved for `resolved_for` was used for `action_id`.
    pub fn foreign(action_id: ActionId, resolved_for: ActionId) -> Self {
        Self {
            action_id,
            violations: vec![FieldViolation::new("", ViolationKind::ForeignAction(resolved_for))],
        }
    }

    /// Whether `field` is among the violations.
    pub fn has_violation_for(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors from building or querying the action registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// No action with this id is registered.
    #[error("unknown action `{0}`")]
    UnknownAction(ActionId),

    /// The id was registered more than once.
    #[error("action `{0}` is already registered")]
    DuplicateAction(ActionId),

    /// The schema's own defaults do not satisfy its constraints.
    #[error("invalid schema for action `{action_id}`: {reason}")]
    InvalidSchema {
        /// Offending action.
        action_id: ActionId,
        /// What is wrong.
        reason: String,
    },
}
