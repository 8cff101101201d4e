//! # Weave Config
//!
//! Layered [`Settings`] for connector services: built-in defaults, an
//! optional TOML file, then `WEAVE_*` environment variables.
//!
//! ```text
//! WEAVE_INTEGRATION__TYPE_SLUG=acme_tracker
//! WEAVE_DISPATCH__COMMAND_TOPIC=integration-actions
//! WEAVE_BUS__BASE_URL=https://pubsub.googleapis.com/v1/projects/acme
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod settings;
pub mod source;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ENV_PREFIX, LoadedSettings, SettingsLoader};
pub use settings::{
    BusSettings, DispatchSettings, IntegrationSettings, RegistrySettings, ServerSettings, Settings,
};
pub use source::ConfigSource;
