//! # Weave Runtime
//!
//! The service core that sits between the inbound surface and the ports:
//!
//! - [`SelfRegistration`] -- publishes the integration type and its actions
//!   to the registry at startup, with bounded retry
//! - [`ActionDispatcher`] -- `trigger_action`: execute in-process or publish
//!   a run-command, according to [`DispatchConfig`]
//! - [`ActionRunner`] -- resolves stored configuration, runs the handler and
//!   reports to the activity log; also handles bus deliveries
//! - [`RuntimeError`] -- error taxonomy with client / terminal classification

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod dispatcher;
pub mod error;
pub mod registration;
pub mod runner;

pub use dispatcher::{ActionDispatcher, DispatchConfig};
pub use weave_action::{DispatchOutcome, TriggerConfig};
pub use error::RuntimeError;
pub use registration::{SelfRegistration, normalize_slug};
pub use runner::{ActionRunner, DeliveryOutcome};
