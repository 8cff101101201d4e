use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Deserialize;
use serde_json::{Value, json};
use weave_action::{ConfigMap, IntegrationId, TriggerSource};

use crate::error::ApiError;
use crate::state::AppState;

/// Body of `POST /v1/actions/execute/`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteRequest {
    /// Target integration.
    pub integration_id: IntegrationId,
    /// Action to run.
    pub action_id: String,
    /// Values superseding stored configuration.
    #[serde(default)]
    pub config_overrides: ConfigMap,
}

/// `POST /v1/actions/execute/` -- run an action in-process.
pub async fn execute_action(
    State(state): State<AppState>,
    request: Result<Json<ExecuteRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = request?;
    tracing::debug!(
        integration_id = %request.integration_id,
        action_id = %request.action_id,
        "direct action trigger"
    );

    let result = state
        .runner
        .execute(
            &request.integration_id,
            &request.action_id,
            &request.config_overrides,
            TriggerSource::Direct,
        )
        .await?;
    Ok(Json(json!({"status": "success", "result": result})))
}
