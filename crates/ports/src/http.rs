//! HTTP drivers for the registry and the command bus.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use url::Url;
use weave_action::{IntegrationId, IntegrationRecord};

use crate::command::{CommandPublisher, PublishAck, RunActionCommand};
use crate::envelope::PushMessage;
use crate::error::PortsError;
use crate::registry::{IntegrationTypeRegistration, RegistryClient};

const MAX_ERROR_BODY: usize = 512;

/// Connection settings shared by the HTTP drivers.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Service root, e.g. `https://registry.example.com/api`.
    pub base_url: Url,
    /// Bearer token sent with every request.
    pub api_key: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl HttpClientConfig {
    /// Parse `base_url` with a 10 second timeout and no credentials.
    pub fn new(base_url: &str) -> Result<Self, PortsError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| PortsError::Internal(format!("invalid base url `{base_url}`: {e}")))?;
        Ok(Self {
            base_url,
            api_key: None,
            timeout: Duration::from_secs(10),
        })
    }

    /// Set the bearer token.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Append percent-encoded `segments` to the base path. A trailing `""`
    /// segment yields a trailing slash.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, PortsError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                PortsError::Internal(format!("base url `{}` cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn build_client(&self) -> Result<Client, PortsError> {
        Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| PortsError::Internal(format!("failed to build http client: {e}")))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

fn transport_error(err: &reqwest::Error, operation: &str, timeout: Duration) -> PortsError {
    if err.is_timeout() {
        PortsError::timeout(operation, timeout)
    } else if err.is_decode() {
        PortsError::Serialization(err.to_string())
    } else {
        PortsError::Connection(err.to_string())
    }
}

/// Map a non-success status to a [`PortsError`]. `entity`/`id` name what a
/// 404 refers to.
async fn check_status(response: Response, entity: &str, id: &str) -> Result<Response, PortsError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let mut body = match response.text().await {
        Ok(body) => body,
        Err(err) => {
            tracing::debug!(%status, error = %err, "failed to read error response body");
            String::new()
        }
    };
    if body.len() > MAX_ERROR_BODY {
        let cut = (0..=MAX_ERROR_BODY)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        body.truncate(cut);
    }
    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PortsError::Unauthorized(body),
        StatusCode::NOT_FOUND => PortsError::not_found(entity, id),
        s if s.is_server_error() => PortsError::Upstream { status: s.as_u16() },
        s => PortsError::rejected(s.as_u16(), body),
    })
}

/// [`RegistryClient`] speaking the registry's REST API.
///
/// - `POST {base}/v2/integrations/types/`
/// - `GET {base}/v2/integrations/{id}/`
#[derive(Debug, Clone)]
pub struct HttpRegistryClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpRegistryClient {
    /// Build a client.
    pub fn new(config: HttpClientConfig) -> Result<Self, PortsError> {
        Ok(Self {
            client: config.build_client()?,
            config,
        })
    }
}

#[async_trait]
impl RegistryClient for HttpRegistryClient {
    async fn register_integration_type(
        &self,
        registration: &IntegrationTypeRegistration,
    ) -> Result<serde_json::Value, PortsError> {
        let url = self.config.endpoint(&["v2", "integrations", "types", ""])?;
        tracing::debug!(%url, slug = %registration.value, "registering integration type");

        let request = self.config.authorize(self.client.post(url).json(registration));
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(&e, "register_integration_type", self.config.timeout))?;
        let response = check_status(response, "IntegrationType", &registration.value).await?;
        response
            .json()
            .await
            .map_err(|e| transport_error(&e, "register_integration_type", self.config.timeout))
    }

    async fn get_integration_details(
        &self,
        integration_id: &IntegrationId,
    ) -> Result<IntegrationRecord, PortsError> {
        let url = self
            .config
            .endpoint(&["v2", "integrations", integration_id.as_str(), ""])?;

        let request = self.config.authorize(self.client.get(url));
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(&e, "get_integration_details", self.config.timeout))?;
        let response = check_status(response, "Integration", integration_id.as_str()).await?;
        response
            .json()
            .await
            .map_err(|e| transport_error(&e, "get_integration_details", self.config.timeout))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishResponse {
    #[serde(default)]
    message_ids: Vec<String>,
}

/// [`CommandPublisher`] for a Pub/Sub style REST endpoint.
///
/// `POST {base}/topics/{topic}:publish` with
/// `{"messages": [{"data": ..., "attributes": {...}}]}`.
#[derive(Debug, Clone)]
pub struct HttpCommandPublisher {
    client: Client,
    config: HttpClientConfig,
}

impl HttpCommandPublisher {
    /// Build a publisher.
    pub fn new(config: HttpClientConfig) -> Result<Self, PortsError> {
        Ok(Self {
            client: config.build_client()?,
            config,
        })
    }
}

#[async_trait]
impl CommandPublisher for HttpCommandPublisher {
    async fn publish(
        &self,
        command: &RunActionCommand,
        topic: &str,
    ) -> Result<PublishAck, PortsError> {
        let message =
            PushMessage::encode(command).map_err(|e| PortsError::Serialization(e.to_string()))?;
        let body = json!({
            "messages": [{"data": message.data, "attributes": message.attributes}]
        });
        let segment = format!("{topic}:publish");
        let url = self.config.endpoint(&["topics", segment.as_str()])?;

        let request = self.config.authorize(self.client.post(url).json(&body));
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(&e, "publish", self.config.timeout))?;
        let response = check_status(response, "Topic", topic).await?;
        let parsed: PublishResponse = response
            .json()
            .await
            .map_err(|e| transport_error(&e, "publish", self.config.timeout))?;

        let message_id = parsed
            .message_ids
            .into_iter()
            .next()
            .ok_or_else(|| PortsError::Serialization("publish response had no message id".into()))?;
        Ok(PublishAck { message_id })
    }
}
