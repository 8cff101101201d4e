//! HTTP driver behaviour against a mock server.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use weave_action::{ActionId, ConfigMap, IntegrationId};
use weave_ports::{
    CommandPublisher, EventEnvelope, HttpClientConfig, HttpCommandPublisher, HttpRegistryClient,
    IntegrationTypeRegistration, PortsError, PushMessage, RegistryClient, RunActionCommand,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn registration() -> IntegrationTypeRegistration {
    IntegrationTypeRegistration {
        name: "Acme Tracker".into(),
        value: "acme_tracker".into(),
        description: "Default type for integrations with Acme Tracker".into(),
        service_url: Some("https://acme-actions.example.com".into()),
        actions: vec![],
    }
}

fn registry_client(server: &MockServer) -> HttpRegistryClient {
    let config = HttpClientConfig::new(&format!("{}/api", server.uri()))
        .unwrap()
        .with_api_key("secret-token");
    HttpRegistryClient::new(config).unwrap()
}

#[tokio::test]
async fn registers_integration_type_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/integrations/types/"))
        .and(header("authorization", "Bearer secret-token"))
        .and(body_partial_json(json!({
            "value": "acme_tracker",
            "service_url": "https://acme-actions.example.com"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "t-1", "value": "acme_tracker"})))
        .expect(1)
        .mount(&server)
        .await;

    let response = registry_client(&server)
        .register_integration_type(&registration())
        .await
        .unwrap();

    assert_eq!(response, json!({"id": "t-1", "value": "acme_tracker"}));
}

#[tokio::test]
async fn fetches_integration_details() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/integrations/i-1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "i-1",
            "name": "North Ranch",
            "base_url": "https://ranch.example.com",
            "type": "acme_tracker",
            "configurations": [
                {"action": "pull_observations", "data": {"lookback_days": 14}}
            ]
        })))
        .mount(&server)
        .await;

    let record = registry_client(&server)
        .get_integration_details(&IntegrationId::new("i-1"))
        .await
        .unwrap();

    assert_eq!(record.name, "North Ranch");
    let stored = record
        .configuration_for(&ActionId::new("pull_observations"))
        .unwrap();
    assert_eq!(stored["lookback_days"], json!(14));
}

#[rstest::rstest]
#[case(401, "unauthorized")]
#[case(403, "unauthorized")]
#[case(404, "not_found")]
#[case(400, "rejected")]
#[case(503, "upstream")]
#[tokio::test]
async fn maps_error_statuses(#[case] status: u16, #[case] expected: &str) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
        .mount(&server)
        .await;

    let err = registry_client(&server)
        .get_integration_details(&IntegrationId::new("i-1"))
        .await
        .unwrap_err();

    let kind = match &err {
        PortsError::Unauthorized(_) => "unauthorized",
        PortsError::NotFound { .. } => "not_found",
        PortsError::Rejected { status: 400, body } if body == "nope" => "rejected",
        PortsError::Upstream { status: 503 } => "upstream",
        other => panic!("unexpected error {other:?}"),
    };
    assert_eq!(kind, expected);
    assert_eq!(err.is_retryable(), status >= 500);
}

#[tokio::test]
async fn slow_registry_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let config = HttpClientConfig::new(&server.uri())
        .unwrap()
        .with_timeout(Duration::from_millis(50));
    let err = HttpRegistryClient::new(config)
        .unwrap()
        .get_integration_details(&IntegrationId::new("i-1"))
        .await
        .unwrap_err();

    assert!(matches!(err, PortsError::Timeout { .. }), "got {err:?}");
    assert!(err.is_retryable());
}

#[tokio::test]
async fn unreachable_registry_is_connection_error() {
    // Port 9 (discard) on loopback is not expected to accept connections.
    let config = HttpClientConfig::new("http://127.0.0.1:9").unwrap();
    let err = HttpRegistryClient::new(config)
        .unwrap()
        .register_integration_type(&registration())
        .await
        .unwrap_err();

    assert!(err.is_retryable(), "got {err:?}");
}

#[tokio::test]
async fn publishes_encoded_command() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/topics/integration-actions:publish"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"messageIds": ["1234"]})))
        .expect(1)
        .mount(&server)
        .await;

    let mut overrides = ConfigMap::new();
    overrides.insert("lookback_days".into(), json!(3));
    let command = RunActionCommand::new("i-1", "pull_observations", overrides);

    let publisher = HttpCommandPublisher::new(HttpClientConfig::new(&server.uri()).unwrap()).unwrap();
    let ack = publisher
        .publish(&command, "integration-actions")
        .await
        .unwrap();
    assert_eq!(ack.message_id, "1234");

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let sent = &body["messages"][0];
    assert_eq!(sent["attributes"]["event_type"], json!("RunIntegrationAction"));

    let message = PushMessage {
        data: sent["data"].as_str().unwrap().to_owned(),
        attributes: serde_json::from_value(sent["attributes"].clone()).unwrap(),
        message_id: ack.message_id,
        publish_time: None,
    };
    let decoded = EventEnvelope::new(message, "sub").decode().unwrap();
    assert_eq!(decoded, command);
}

#[tokio::test]
async fn topic_is_percent_encoded_in_publish_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/topics/team%20a%2Factions:publish"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"messageIds": ["7"]})))
        .expect(1)
        .mount(&server)
        .await;

    let publisher = HttpCommandPublisher::new(HttpClientConfig::new(&server.uri()).unwrap()).unwrap();
    let command = RunActionCommand::new("i-1", "auth", ConfigMap::new());
    let ack = publisher.publish(&command, "team a/actions").await.unwrap();
    assert_eq!(ack.message_id, "7");
}

#[tokio::test]
async fn publish_without_message_id_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let publisher = HttpCommandPublisher::new(HttpClientConfig::new(&server.uri()).unwrap()).unwrap();
    let command = RunActionCommand::new("i-1", "auth", ConfigMap::new());
    let err = publisher.publish(&command, "t").await.unwrap_err();
    assert!(matches!(err, PortsError::Serialization(_)));
}
