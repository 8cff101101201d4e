//! Logger builder implementation

use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, Format};
use crate::error::{LogError, LogResult};

/// Logger builder
#[derive(Debug)]
pub struct LoggerBuilder {
    config: Config,
}

/// Handle to the installed logger.
///
/// Carries the service root span. Instrument futures with it and parent
/// per-task spans on it; spawned tasks do not inherit it on their own.
#[derive(Debug)]
pub struct LoggerGuard {
    root_span: tracing::Span,
}

impl LoggerGuard {
    /// Root span carrying the `service` field, or a disabled span when no
    /// service name is configured.
    pub fn span(&self) -> &tracing::Span {
        &self.root_span
    }
}

/// Build the registry with `$filter` and `$fmt` and install it globally.
macro_rules! try_init_subscriber {
    ($filter:expr, $fmt:expr) => {
        Registry::default()
            .with($filter)
            .with($fmt)
            .try_init()
            .map_err(|e| LogError::Init(e.to_string()))
    };
}

impl LoggerBuilder {
    /// Create builder from config
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Parse the configured filter.
    pub fn filter(&self) -> LogResult<EnvFilter> {
        EnvFilter::try_new(&self.config.level)
            .map_err(|e| LogError::Filter(format!("{}: {e}", self.config.level)))
    }

    /// Build and install the global subscriber.
    ///
    /// Fails when the filter does not parse or a subscriber is already set.
    pub fn build(self) -> LogResult<LoggerGuard> {
        let filter = self.filter()?;
        let config = &self.config;

        match config.format {
            Format::Pretty => try_init_subscriber!(
                filter,
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_ansi(config.ansi)
                    .with_target(config.target)
            )?,
            Format::Compact => try_init_subscriber!(
                filter,
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_ansi(config.ansi)
                    .with_target(config.target)
            )?,
            Format::Json => try_init_subscriber!(
                filter,
                tracing_subscriber::fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_target(config.target)
            )?,
        }

        let root_span = config
            .service
            .as_deref()
            .map_or_else(tracing::Span::none, |service| {
                tracing::info_span!("service", service)
            });

        Ok(LoggerGuard { root_span })
    }
}
