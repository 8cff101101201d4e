//! Push-delivery envelope carrying an encoded [`RunActionCommand`].
//!
//! Wire shape:
//!
//! ```json
//! {
//!   "message": {
//!     "data": "<base64(json(command))>",
//!     "attributes": {"event_type": "RunIntegrationAction", "schema_version": "v1"},
//!     "messageId": "123",
//!     "publishTime": "2024-12-01T10:00:00Z"
//!   },
//!   "subscription": "projects/p/subscriptions/actions"
//! }
//! ```

use std::collections::BTreeMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::command::RunActionCommand;

/// `event_type` attribute value for run-commands.
pub const RUN_ACTION_EVENT_TYPE: &str = "RunIntegrationAction";
/// `schema_version` attribute value written by this crate.
pub const SCHEMA_VERSION: &str = "v1";

const EVENT_TYPE_ATTR: &str = "event_type";
const SCHEMA_VERSION_ATTR: &str = "schema_version";

/// Errors decoding an envelope.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    /// The message carried no data.
    #[error("message has no data")]
    Empty,

    /// `data` is not valid base64.
    #[error("invalid base64 data: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// The envelope or the decoded data is not the expected JSON.
    #[error("invalid payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// The message is some other event.
    #[error("unexpected event type `{0}`")]
    UnexpectedEventType(String),
}

/// A single bus message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    /// Base64-encoded JSON payload.
    #[serde(default)]
    pub data: String,
    /// String attributes.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Bus-assigned id.
    #[serde(default, alias = "message_id")]
    pub message_id: String,
    /// Publish timestamp as sent by the bus.
    #[serde(default, alias = "publish_time", skip_serializing_if = "Option::is_none")]
    pub publish_time: Option<String>,
}

impl PushMessage {
    /// Encode a command. `message_id` and `publish_time` are left for the bus.
    pub fn encode(command: &RunActionCommand) -> Result<Self, EnvelopeError> {
        let json = serde_json::to_vec(command)?;
        let attributes = BTreeMap::from([
            (EVENT_TYPE_ATTR.to_owned(), RUN_ACTION_EVENT_TYPE.to_owned()),
            (SCHEMA_VERSION_ATTR.to_owned(), SCHEMA_VERSION.to_owned()),
        ]);
        Ok(Self {
            data: STANDARD.encode(json),
            attributes,
            message_id: String::new(),
            publish_time: None,
        })
    }

    /// Decode the carried command.
    ///
    /// A missing `event_type` attribute is accepted; a different one is not.
    pub fn decode(&self) -> Result<RunActionCommand, EnvelopeError> {
        if let Some(event_type) = self.attributes.get(EVENT_TYPE_ATTR)
            && event_type != RUN_ACTION_EVENT_TYPE
        {
            return Err(EnvelopeError::UnexpectedEventType(event_type.clone()));
        }
        if self.data.is_empty() {
            return Err(EnvelopeError::Empty);
        }
        let bytes = STANDARD.decode(self.data.trim())?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Push delivery wrapping one [`PushMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// The delivered message.
    pub message: PushMessage,
    /// Subscription the delivery came from.
    #[serde(default)]
    pub subscription: String,
}

impl EventEnvelope {
    /// Wrap a message.
    pub fn new(message: PushMessage, subscription: impl Into<String>) -> Self {
        Self {
            message,
            subscription: subscription.into(),
        }
    }

    /// Parse a raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, EnvelopeError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Decode the carried command.
    pub fn decode(&self) -> Result<RunActionCommand, EnvelopeError> {
        self.message.decode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn command() -> RunActionCommand {
        let overrides = json!({"start": "2024-12-01T00:00:00Z", "end": "2024-12-02T00:00:00Z"});
        let serde_json::Value::Object(overrides) = overrides else {
            unreachable!()
        };
        RunActionCommand::new("i-1", "pull_observations", overrides)
    }

    #[test]
    fn encode_then_decode_preserves_command() {
        let mut message = PushMessage::encode(&command()).unwrap();
        message.message_id = "42".into();
        let envelope = EventEnvelope::new(message, "projects/p/subscriptions/actions");

        let body = serde_json::to_vec(&envelope).unwrap();
        let parsed = EventEnvelope::from_slice(&body).unwrap();

        assert_eq!(parsed.message.message_id, "42");
        assert_eq!(parsed.decode().unwrap(), command());
    }

    #[test]
    fn attributes_carry_event_type_and_version() {
        let message = PushMessage::encode(&command()).unwrap();
        assert_eq!(message.attributes["event_type"], "RunIntegrationAction");
        assert_eq!(message.attributes["schema_version"], "v1");
    }

    #[test]
    fn accepts_snake_case_message_id() {
        let envelope = EventEnvelope::from_slice(
            br#"{"message": {"data": "", "message_id": "7", "publish_time": "now"}}"#,
        )
        .unwrap();
        assert_eq!(envelope.message.message_id, "7");
        assert_eq!(envelope.message.publish_time.as_deref(), Some("now"));
        assert!(envelope.subscription.is_empty());
    }

    #[test]
    fn empty_data_is_rejected() {
        let envelope = EventEnvelope::from_slice(br#"{"message": {"messageId": "1"}}"#).unwrap();
        assert!(matches!(envelope.decode(), Err(EnvelopeError::Empty)));
    }

    #[test]
    fn bad_base64_is_rejected() {
        let envelope =
            EventEnvelope::from_slice(br#"{"message": {"data": "!!not base64!!"}}"#).unwrap();
        assert!(matches!(envelope.decode(), Err(EnvelopeError::Encoding(_))));
    }

    #[test]
    fn non_command_payload_is_rejected() {
        let data = STANDARD.encode(br#"{"hello": "world"}"#);
        let body = json!({"message": {"data": data}}).to_string();
        let envelope = EventEnvelope::from_slice(body.as_bytes()).unwrap();
        assert!(matches!(envelope.decode(), Err(EnvelopeError::Payload(_))));
    }

    #[test]
    fn other_event_type_is_rejected() {
        let mut message = PushMessage::encode(&command()).unwrap();
        message
            .attributes
            .insert("event_type".into(), "IntegrationActionStarted".into());
        assert!(matches!(
            message.decode(),
            Err(EnvelopeError::UnexpectedEventType(t)) if t == "IntegrationActionStarted"
        ));
    }

    #[test]
    fn malformed_body_is_rejected() {
        assert!(matches!(
            EventEnvelope::from_slice(b"not json"),
            Err(EnvelopeError::Payload(_))
        ));
    }
}
