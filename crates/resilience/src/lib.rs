//! # Weave Resilience
//!
//! Explicit bounded retry for outbound calls.
//!
//! - [`RetryPolicy`] -- attempt budget and exponential backoff
//! - [`retry`] -- run an operation under a policy with a caller predicate
//! - [`Retryable`] -- let an error type classify itself, used by [`retry_retryable`]

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod retry;
mod retryable;

pub use retry::{JitterPolicy, RetryError, RetryPolicy, retry, retry_retryable};
pub use retryable::Retryable;
