#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Weave Ports
//!
//! Collaborator interfaces (ports) of the connector service and their
//! drivers:
//!
//! - [`RegistryClient`] -- remote integration registry
//! - [`CommandPublisher`] -- command bus for asynchronous execution
//! - [`ActivityLogger`] -- execution activity log
//!
//! All traits are `async_trait` and object-safe, used as `Arc<dyn Trait>`
//! behind dependency injection. [`memory`] provides in-process drivers,
//! [`http`] the `reqwest` based ones. [`envelope`] is the wire codec for
//! commands delivered by the bus.

pub mod activity;
pub mod command;
pub mod envelope;
pub mod error;
pub mod http;
pub mod memory;
pub mod registry;

pub use activity::{ActivityEvent, ActivityKind, ActivityLogger, TracingActivityLogger};
pub use command::{CommandPublisher, PublishAck, RunActionCommand};
pub use envelope::{EnvelopeError, EventEnvelope, PushMessage};
pub use error::PortsError;
pub use http::{HttpClientConfig, HttpCommandPublisher, HttpRegistryClient};
pub use memory::{InMemoryActivityLog, InMemoryPublisher, InMemoryRegistryClient, PublishedMessage};
pub use registry::{ActionRegistration, IntegrationTypeRegistration, RegistryClient};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check that every port is object-safe.
    #[test]
    fn traits_are_object_safe() {
        fn _assert_registry(_: &dyn RegistryClient) {}
        fn _assert_publisher(_: &dyn CommandPublisher) {}
        fn _assert_activity(_: &dyn ActivityLogger) {}
    }

    /// Verify ports can be wrapped in `Arc` for shared ownership.
    #[test]
    fn traits_work_as_arc_dyn() {
        use std::sync::Arc;
        fn _takes_registry(_: Arc<dyn RegistryClient>) {}
        fn _takes_publisher(_: Arc<dyn CommandPublisher>) {}
        fn _takes_activity(_: Arc<dyn ActivityLogger>) {}
    }
}
