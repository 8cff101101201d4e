//! Actions served by this connector.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use weave_action::{
    ActionConfigSchema, ActionContext, ActionError, ActionHandler, ActionRegistry, ConfigSubtype,
    FieldSpec, RegistryError, ResolvedActionConfig,
};

/// Build the frozen action registry.
pub fn registry() -> Result<ActionRegistry, RegistryError> {
    Ok(ActionRegistry::builder()
        .register("auth", auth_schema(), Authenticate)?
        .register("pull_observations", pull_schema(), PullObservations)?
        .build())
}

fn auth_schema() -> ActionConfigSchema {
    ActionConfigSchema::new("AuthenticateConfig", ConfigSubtype::Auth)
        .with_description("Credentials for the remote API")
        .with_field(FieldSpec::string("username").required().with_min_length(1))
        .with_field(FieldSpec::string("password").required().with_min_length(1))
}

fn pull_schema() -> ActionConfigSchema {
    ActionConfigSchema::new("PullObservationsConfig", ConfigSubtype::Pull)
        .with_description("Periodic pull of recent observations")
        .with_field(
            FieldSpec::integer("lookback_days")
                .with_default(7)
                .with_minimum(1.0)
                .with_maximum(90.0)
                .with_description("How many days back to fetch"),
        )
}

struct Authenticate;

#[async_trait]
impl ActionHandler for Authenticate {
    async fn execute(
        &self,
        ctx: &ActionContext,
        config: &ResolvedActionConfig,
    ) -> Result<Value, ActionError> {
        let Some(base_url) = ctx.integration.base_url.as_deref() else {
            return Err(ActionError::fatal("integration has no base_url"));
        };
        let username = config.get_str("username").unwrap_or_default();
        tracing::info!(integration_id = %ctx.integration.id, username, base_url, "checking credentials");
        Ok(json!({"valid_credentials": true}))
    }
}

#[derive(Debug, Deserialize)]
struct PullConfig {
    lookback_days: i64,
}

struct PullObservations;

#[async_trait]
impl ActionHandler for PullObservations {
    async fn execute(
        &self,
        ctx: &ActionContext,
        config: &ResolvedActionConfig,
    ) -> Result<Value, ActionError> {
        let PullConfig { lookback_days } = config
            .parse()
            .map_err(|e| ActionError::validation(e.to_string()))?;
        let end = Utc::now();
        let start = end - Duration::days(lookback_days);
        tracing::info!(
            integration_id = %ctx.integration.id,
            %start,
            %end,
            "pulling observations"
        );
        Ok(json!({
            "observations_extracted": 0,
            "start": start.to_rfc3339(),
            "end": end.to_rfc3339(),
        }))
    }
}
