//! Convenience re-exports for connector authors.
//!
//! ```rust
//! use weave_action::prelude::*;
//! ```

pub use crate::config::{ConfigMap, ResolvedActionConfig};
pub use crate::context::ActionContext;
pub use crate::error::ActionError;
pub use crate::handler::{ActionHandler, handler_fn};
pub use crate::id::{ActionId, IntegrationId};
pub use crate::metadata::ActionType;
pub use crate::registry::{ActionRegistry, ActionRegistryBuilder};
pub use crate::schema::{ActionConfigSchema, ConfigSubtype, FieldSpec};
pub use crate::trigger::{DispatchOutcome, TriggerConfig};
