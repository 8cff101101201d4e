//! HTTP error mapping

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use weave_runtime::RuntimeError;

/// Error returned by the route handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body could not be parsed.
    #[error("invalid request body: {0}")]
    BadRequest(String),

    /// Execution failed.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Runtime(err) => runtime_status(err),
        }
    }
}

/// Status for a runtime failure.
///
/// Request faults are 4xx, collaborator faults 502, everything else 500.
pub fn runtime_status(err: &RuntimeError) -> StatusCode {
    match err {
        RuntimeError::UnknownAction(_) | RuntimeError::UnknownIntegration(_) => {
            StatusCode::NOT_FOUND
        }
        RuntimeError::ConfigValidation(_) | RuntimeError::Envelope(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        RuntimeError::RegistryTransport { .. }
        | RuntimeError::Registry(_)
        | RuntimeError::Publish { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    status: &'static str,
    detail: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    violations: Vec<ViolationBody>,
}

#[derive(Debug, Serialize)]
struct ViolationBody {
    field: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let violations = match &self {
            Self::Runtime(RuntimeError::ConfigValidation(err)) => err
                .violations
                .iter()
                .map(|v| ViolationBody {
                    field: v.field.clone(),
                    message: v.kind.to_string(),
                })
                .collect(),
            _ => Vec::new(),
        };
        let body = ErrorBody {
            status: "error",
            detail: self.to_string(),
            violations,
        };
        (status, Json(body)).into_response()
    }
}
