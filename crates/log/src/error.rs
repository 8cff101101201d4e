//! Logger setup errors

/// Result alias for logger setup.
pub type LogResult<T> = Result<T, LogError>;

/// Errors raised while building the logger.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LogError {
    /// The filter directive could not be parsed.
    #[error("invalid log filter `{0}`")]
    Filter(String),

    /// The format name is not known.
    #[error("unknown log format `{0}` (expected pretty, compact or json)")]
    UnknownFormat(String),

    /// A global subscriber was already installed.
    #[error("failed to install subscriber: {0}")]
    Init(String),
}
