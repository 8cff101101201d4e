//! # Weave Action System
//!
//! Declarative configuration schemas, executable handlers and the static
//! registry that pairs them.
//!
//! A connector declares each action once at startup: an id, an
//! [`ActionConfigSchema`] tagged with a [`ConfigSubtype`], and an
//! [`ActionHandler`]. The frozen [`ActionRegistry`] derives classification
//! and periodicity from the schema, projects entries for the remote
//! integration registry, and validates caller overrides.
//!
//! ## Core Types
//!
//! - [`ActionConfigSchema`] / [`FieldSpec`] -- configuration shape
//! - [`ActionRegistry`] / [`ActionRegistryBuilder`] -- startup-built lookup table
//! - [`ActionHandler`] -- executable unit, see [`handler_fn`] for closures
//! - [`ActionTrigger`] -- lets a handler start sub-actions through [`ActionContext`]
//! - [`ResolvedActionConfig`] -- merged and validated config for one execution
//! - [`ActionError`] -- handler failures
//! - [`ConfigValidationError`] -- every field violation of one call
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::{Map, json};
//! use weave_action::prelude::*;
//!
//! let registry = ActionRegistry::builder()
//!     .register(
//!         "pull_observations",
//!         ActionConfigSchema::new("PullObservationsConfig", ConfigSubtype::Pull)
//!             .with_field(FieldSpec::integer("lookback_days").with_default(7)),
//!         handler_fn(|_ctx, cfg| async move {
//!             Ok(json!({"days": cfg.get_i64("lookback_days")}))
//!         }),
//!     )
//!     .unwrap()
//!     .build();
//!
//! let action = registry.get("pull_observations").unwrap();
//! assert!(action.is_periodic());
//!
//! let mut overrides = Map::new();
//! overrides.insert("lookback_days".into(), json!("two"));
//! assert!(action.validate_overrides(&overrides).is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Override validation and configuration resolution.
pub mod config;
/// Execution context passed to handlers.
pub mod context;
/// Error types for handlers, validation and registry construction.
pub mod error;
/// Handler trait and closure adapter.
pub mod handler;
/// Action and integration identifiers.
pub mod id;
/// Integration records returned by the registry service.
pub mod integration;
/// Action classification and display naming.
pub mod metadata;
/// Convenience re-exports for connector authors.
pub mod prelude;
/// Static action registry.
pub mod registry;
/// Declarative configuration schemas.
pub mod schema;
/// Sub-action triggering from handlers.
pub mod trigger;

// ── Public re-exports ───────────────────────────────────────────────────────

pub use config::{ConfigMap, ResolvedActionConfig};
pub use context::{ActionContext, TriggerSource};
pub use error::{
    ActionError, ConfigValidationError, FieldViolation, RegistryError, ViolationKind,
};
pub use handler::{ActionHandler, FnHandler, handler_fn};
pub use id::{ActionId, IntegrationId};
pub use integration::{IntegrationRecord, StoredActionConfig};
pub use metadata::{ActionType, humanize};
pub use registry::{
    ActionRegistry, ActionRegistryBuilder, ActionRegistryEntry, RegisteredAction, classify,
    is_periodic,
};
pub use schema::{ActionConfigSchema, ConfigSubtype, FieldSpec, FieldType};
pub use trigger::{ActionTrigger, DispatchOutcome, TriggerConfig};
