//! Retry classification for domain errors.

use std::error::Error;

/// Errors that know whether another attempt could succeed.
///
/// # Examples
///
/// ```
/// use weave_resilience::Retryable;
///
/// #[derive(Debug, thiserror::Error)]
/// enum RegistryCallError {
///     #[error("connection refused")]
///     Connection,
///     #[error("unauthorized")]
///     Unauthorized,
/// }
///
/// impl Retryable for RegistryCallError {
///     fn is_retryable(&self) -> bool {
///         matches!(self, Self::Connection)
///     }
/// }
///
/// assert!(RegistryCallError::Connection.is_retryable());
/// assert!(!RegistryCallError::Unauthorized.is_retryable());
/// ```
pub trait Retryable: Error {
    /// Whether retrying may succeed.
    fn is_retryable(&self) -> bool;
}
