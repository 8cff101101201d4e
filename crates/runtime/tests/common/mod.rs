//! Shared fixture: an action registry wired to in-memory ports.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use serde_json::{Value, json};
use weave_action::config::resolve;
use weave_action::{
    ActionConfigSchema, ActionError, ActionId, ActionRegistry, ConfigMap, ConfigSubtype,
    DispatchOutcome, FieldSpec, IntegrationRecord, handler_fn,
};
use weave_ports::{InMemoryActivityLog, InMemoryPublisher, InMemoryRegistryClient};
use weave_runtime::{ActionDispatcher, ActionRunner, DispatchConfig};

pub const INTEGRATION: &str = "i-1";
pub const TOPIC: &str = "integration-actions";

pub struct Harness {
    pub registry: Arc<ActionRegistry>,
    pub registry_client: Arc<InMemoryRegistryClient>,
    pub publisher: Arc<InMemoryPublisher>,
    pub activity: Arc<InMemoryActivityLog>,
    pub runner: Arc<ActionRunner>,
    pub handler_calls: Arc<AtomicUsize>,
    pub seen_lookback: Arc<Mutex<Vec<i64>>>,
}

impl Harness {
    pub fn new() -> Self {
        let handler_calls = Arc::new(AtomicUsize::new(0));
        let seen_lookback = Arc::new(Mutex::new(Vec::new()));

        let calls = Arc::clone(&handler_calls);
        let seen = Arc::clone(&seen_lookback);
        let by_date_schema = by_date_schema();
        let registry = Arc::new(
            ActionRegistry::builder()
                .register(
                    "auth",
                    ActionConfigSchema::new("AuthenticateConfig", ConfigSubtype::Auth)
                        .with_field(FieldSpec::string("token").with_default("t0")),
                    handler_fn(|_, config| async move {
                        match config.get_str("token") {
                            Some("bad") => Err(ActionError::fatal("invalid credentials")),
                            _ => Ok(json!({"valid_credentials": true})),
                        }
                    }),
                )
                .unwrap()
                .register(
                    "pull_observations",
                    ActionConfigSchema::new("PullObservationsConfig", ConfigSubtype::Pull)
                        .with_field(
                            FieldSpec::integer("lookback_days")
                                .with_default(7)
                                .with_minimum(1.0),
                        ),
                    handler_fn(move |_, config| {
                        let calls = Arc::clone(&calls);
                        let seen = Arc::clone(&seen);
                        async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            let days = config.get_i64("lookback_days").unwrap_or_default();
                            seen.lock().push(days);
                            Ok(json!({"observations_extracted": days * 10}))
                        }
                    }),
                )
                .unwrap()
                .register(
                    "pull_observations_by_date",
                    by_date_schema.clone(),
                    handler_fn(|_, config| async move {
                        Ok(json!({"window": [config.get_str("start"), config.get_str("end")]}))
                    }),
                )
                .unwrap()
                .register(
                    "pull_recent_window",
                    ActionConfigSchema::new("PullRecentWindowConfig", ConfigSubtype::Pull),
                    handler_fn(move |ctx, _| {
                        let schema = by_date_schema.clone();
                        async move {
                            let window = overrides(json!({
                                "start": "2024-01-01T00:00:00Z",
                                "end": "2024-01-02T00:00:00Z",
                            }));
                            let config = resolve(
                                &ActionId::new("pull_observations_by_date"),
                                &schema,
                                None,
                                &window,
                            )
                            .map_err(|err| ActionError::validation(err.to_string()))?;
                            match ctx
                                .trigger_action("pull_observations_by_date", config)
                                .await?
                            {
                                DispatchOutcome::Executed(result) => Ok(json!({"executed": result})),
                                DispatchOutcome::Published { message_id, .. } => {
                                    Ok(json!({"published": message_id}))
                                }
                            }
                        }
                    }),
                )
                .unwrap()
                .build(),
        );

        let registry_client = Arc::new(
            InMemoryRegistryClient::new()
                .with_integration(IntegrationRecord::new(INTEGRATION, "North Ranch")),
        );
        let publisher = Arc::new(InMemoryPublisher::new());
        let activity = Arc::new(InMemoryActivityLog::new());
        let runner = Arc::new(ActionRunner::new(
            Arc::clone(&registry),
            registry_client.clone(),
            activity.clone(),
        ));

        Self {
            registry,
            registry_client,
            publisher,
            activity,
            runner,
            handler_calls,
            seen_lookback,
        }
    }

    /// Replace the stored integration record.
    pub fn with_integration(self, record: IntegrationRecord) -> Self {
        let registry_client = Arc::new(InMemoryRegistryClient::new().with_integration(record));
        let runner = Arc::new(ActionRunner::new(
            Arc::clone(&self.registry),
            registry_client.clone(),
            self.activity.clone(),
        ));
        Self {
            registry_client,
            runner,
            ..self
        }
    }

    pub fn dispatcher(&self, config: DispatchConfig) -> Arc<ActionDispatcher> {
        ActionDispatcher::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.runner),
            self.publisher.clone(),
            config,
        )
    }

    pub fn handler_calls(&self) -> usize {
        self.handler_calls.load(Ordering::SeqCst)
    }
}

fn by_date_schema() -> ActionConfigSchema {
    ActionConfigSchema::new("PullObservationsByDateConfig", ConfigSubtype::Pull)
        .with_field(FieldSpec::datetime("start").required())
        .with_field(FieldSpec::datetime("end").required())
}

pub fn overrides(value: Value) -> ConfigMap {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}
