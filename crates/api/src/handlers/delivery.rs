use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::{Value, json};
use weave_runtime::DeliveryOutcome;

use crate::error::runtime_status;
use crate::state::AppState;

/// `POST /` -- push delivery from the command bus.
///
/// Undeliverable messages are acknowledged with 200 so the bus does not
/// redeliver them; other failures answer with an error status.
pub async fn handle_delivery(
    State(state): State<AppState>,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    match state.runner.handle_raw_delivery(&body).await {
        DeliveryOutcome::Completed(result) => (
            StatusCode::OK,
            Json(json!({"status": "success", "result": result})),
        ),
        DeliveryOutcome::Dropped { reason } => (
            StatusCode::OK,
            Json(json!({"status": "dropped", "reason": reason})),
        ),
        DeliveryOutcome::Failed(err) => {
            let mut status = runtime_status(&err);
            if !status.is_server_error() {
                status = StatusCode::INTERNAL_SERVER_ERROR;
            }
            (
                status,
                Json(json!({"status": "error", "detail": err.to_string()})),
            )
        }
    }
}
