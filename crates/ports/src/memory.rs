//! In-memory drivers for every port.
//!
//! Used by the test suites and for running the service without a registry
//! or bus. State lives behind `parking_lot::Mutex`; locks are never held
//! across an `.await`.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use weave_action::{IntegrationId, IntegrationRecord};

use crate::activity::{ActivityEvent, ActivityLogger};
use crate::command::{CommandPublisher, PublishAck, RunActionCommand};
use crate::envelope::{EventEnvelope, PushMessage};
use crate::error::PortsError;
use crate::registry::{IntegrationTypeRegistration, RegistryClient};

/// In-memory [`RegistryClient`].
///
/// `register_integration_type` pops scripted results in order and echoes
/// the payload once the script is exhausted.
#[derive(Debug, Default)]
pub struct InMemoryRegistryClient {
    integrations: Mutex<HashMap<IntegrationId, IntegrationRecord>>,
    register_script: Mutex<VecDeque<Result<serde_json::Value, PortsError>>>,
    registrations: Mutex<Vec<IntegrationTypeRegistration>>,
    detail_calls: AtomicUsize,
}

impl InMemoryRegistryClient {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an integration record.
    pub fn with_integration(self, record: IntegrationRecord) -> Self {
        self.integrations.lock().insert(record.id.clone(), record);
        self
    }

    /// Queue the result of the next `register_integration_type` call.
    pub fn push_register_result(&self, result: Result<serde_json::Value, PortsError>) {
        self.register_script.lock().push_back(result);
    }

    /// Every payload received, including failed attempts.
    pub fn registrations(&self) -> Vec<IntegrationTypeRegistration> {
        self.registrations.lock().clone()
    }

    /// Number of `register_integration_type` calls.
    pub fn register_calls(&self) -> usize {
        self.registrations.lock().len()
    }

    /// Number of `get_integration_details` calls.
    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RegistryClient for InMemoryRegistryClient {
    async fn register_integration_type(
        &self,
        registration: &IntegrationTypeRegistration,
    ) -> Result<serde_json::Value, PortsError> {
        self.registrations.lock().push(registration.clone());
        let scripted = self.register_script.lock().pop_front();
        match scripted {
            Some(result) => result,
            None => Ok(serde_json::to_value(registration)?),
        }
    }

    async fn get_integration_details(
        &self,
        integration_id: &IntegrationId,
    ) -> Result<IntegrationRecord, PortsError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.integrations
            .lock()
            .get(integration_id)
            .cloned()
            .ok_or_else(|| PortsError::not_found("Integration", integration_id.as_str()))
    }
}

/// A message accepted by [`InMemoryPublisher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    /// Topic it was published to.
    pub topic: String,
    /// Encoded message, with its assigned id.
    pub message: PushMessage,
}

impl PublishedMessage {
    /// Wrap as a push delivery, the way the bus would hand it back.
    pub fn to_envelope(&self, subscription: &str) -> EventEnvelope {
        EventEnvelope::new(self.message.clone(), subscription)
    }
}

/// In-memory [`CommandPublisher`] that records every command.
///
/// Message ids are `msg-1`, `msg-2`, ...
#[derive(Debug, Default)]
pub struct InMemoryPublisher {
    published: Mutex<Vec<PublishedMessage>>,
    commands: Mutex<Vec<RunActionCommand>>,
    fail: AtomicBool,
}

impl InMemoryPublisher {
    /// Publisher that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent publishes fail with a connection error.
    pub fn fail_publishes(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Accepted messages in publish order.
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.published.lock().clone()
    }

    /// Accepted commands in publish order.
    pub fn commands(&self) -> Vec<RunActionCommand> {
        self.commands.lock().clone()
    }
}

#[async_trait]
impl CommandPublisher for InMemoryPublisher {
    async fn publish(
        &self,
        command: &RunActionCommand,
        topic: &str,
    ) -> Result<PublishAck, PortsError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortsError::Connection(format!("topic {topic} unavailable")));
        }
        let mut message = PushMessage::encode(command)
            .map_err(|e| PortsError::Serialization(e.to_string()))?;

        let mut published = self.published.lock();
        let message_id = format!("msg-{}", published.len() + 1);
        message.message_id.clone_from(&message_id);
        published.push(PublishedMessage {
            topic: topic.to_owned(),
            message,
        });
        self.commands.lock().push(command.clone());
        Ok(PublishAck { message_id })
    }
}

/// In-memory [`ActivityLogger`].
#[derive(Debug, Default)]
pub struct InMemoryActivityLog {
    events: Mutex<Vec<ActivityEvent>>,
    fail: AtomicBool,
}

impl InMemoryActivityLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent records fail.
    pub fn fail_records(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Recorded events in order.
    pub fn events(&self) -> Vec<ActivityEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl ActivityLogger for InMemoryActivityLog {
    async fn record(&self, event: ActivityEvent) -> Result<(), PortsError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortsError::Internal("activity log unavailable".into()));
        }
        self.events.lock().push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use weave_action::ConfigMap;

    #[tokio::test]
    async fn registry_pops_script_then_echoes() {
        let client = InMemoryRegistryClient::new();
        client.push_register_result(Err(PortsError::Connection("down".into())));

        let payload = IntegrationTypeRegistration {
            name: "Acme".into(),
            value: "acme".into(),
            description: "d".into(),
            service_url: None,
            actions: vec![],
        };

        assert!(client.register_integration_type(&payload).await.is_err());
        let echoed = client.register_integration_type(&payload).await.unwrap();
        assert_eq!(echoed["value"], json!("acme"));
        assert_eq!(client.register_calls(), 2);
    }

    #[tokio::test]
    async fn registry_unknown_integration_is_not_found() {
        let client = InMemoryRegistryClient::new().with_integration(IntegrationRecord::new("a", "A"));
        assert!(client.get_integration_details(&"a".into()).await.is_ok());
        let err = client.get_integration_details(&"b".into()).await.unwrap_err();
        assert!(matches!(err, PortsError::NotFound { .. }));
        assert_eq!(client.detail_calls(), 2);
    }

    #[tokio::test]
    async fn publisher_assigns_sequential_ids() {
        let publisher = InMemoryPublisher::new();
        let cmd = RunActionCommand::new("i-1", "pull", ConfigMap::new());

        let first = publisher.publish(&cmd, "actions").await.unwrap();
        let second = publisher.publish(&cmd, "actions").await.unwrap();

        assert_eq!(first.message_id, "msg-1");
        assert_eq!(second.message_id, "msg-2");
        assert_eq!(publisher.commands(), vec![cmd.clone(), cmd.clone()]);

        let envelope = publisher.published()[1].to_envelope("sub");
        assert_eq!(envelope.message.message_id, "msg-2");
        assert_eq!(envelope.decode().unwrap(), cmd);
    }

    #[tokio::test]
    async fn failing_publisher_records_nothing() {
        let publisher = InMemoryPublisher::new();
        publisher.fail_publishes(true);
        let cmd = RunActionCommand::new("i-1", "pull", ConfigMap::new());
        let err = publisher.publish(&cmd, "actions").await.unwrap_err();
        assert!(err.is_retryable());
        assert!(publisher.commands().is_empty());
    }
}
