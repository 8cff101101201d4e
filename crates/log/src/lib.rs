//! # Weave Log
//!
//! `tracing-subscriber` setup shared by Weave binaries.
//!
//! ```no_run
//! use weave_log::{Config, Format, LoggerBuilder};
//!
//! let config = Config {
//!     format: Format::Json,
//!     ..Config::default()
//! };
//! let logger = LoggerBuilder::from_config(config.with_service("acme-actions"))
//!     .build()
//!     .expect("logger");
//! logger.span().in_scope(|| tracing::info!("ready"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod builder;
pub mod config;
pub mod error;

pub use builder::{LoggerBuilder, LoggerGuard};
pub use config::{Config, Format};
pub use error::{LogError, LogResult};
