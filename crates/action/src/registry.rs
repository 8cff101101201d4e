use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::{self, ConfigMap, ResolvedActionConfig};
use crate::error::{ConfigValidationError, RegistryError};
use crate::handler::ActionHandler;
use crate::id::ActionId;
use crate::metadata::{ActionType, humanize};
use crate::schema::ActionConfigSchema;

/// Classify an action by its schema's subtype marker.
pub fn classify(schema: &ActionConfigSchema) -> ActionType {
    ActionType::from(schema.subtype())
}

/// Whether an action with this schema runs on a schedule.
pub fn is_periodic(schema: &ActionConfigSchema) -> bool {
    classify(schema).is_periodic()
}

/// A handler paired with its configuration schema.
#[derive(Clone)]
pub struct RegisteredAction {
    id: ActionId,
    schema: Arc<ActionConfigSchema>,
    handler: Arc<dyn ActionHandler>,
}

impl RegisteredAction {
    /// Action id.
    pub fn id(&self) -> &ActionId {
        &self.id
    }

    /// Configuration schema.
    pub fn schema(&self) -> &ActionConfigSchema {
        &self.schema
    }

    /// Shared handler.
    pub fn handler(&self) -> Arc<dyn ActionHandler> {
        Arc::clone(&self.handler)
    }

    /// Classification derived from the schema.
    pub fn action_type(&self) -> ActionType {
        classify(&self.schema)
    }

    /// Whether the action is periodic.
    pub fn is_periodic(&self) -> bool {
        is_periodic(&self.schema)
    }

    /// Validate caller overrides against this action's schema.
    pub fn validate_overrides(&self, overrides: &ConfigMap) -> Result<(), ConfigValidationError> {
        config::validate_overrides(&self.id, &self.schema, overrides)
    }

    /// Merge stored configuration and overrides into a resolved config.
    pub fn resolve(
        &self,
        base: Option<&ConfigMap>,
        overrides: &ConfigMap,
    ) -> Result<ResolvedActionConfig, ConfigValidationError> {
        config::resolve(&self.id, &self.schema, base, overrides)
    }

    /// Registry-facing projection of this action.
    pub fn entry(&self) -> ActionRegistryEntry {
        let action_type = self.action_type();
        ActionRegistryEntry {
            action_id: self.id.clone(),
            name: humanize(self.id.as_str()),
            action_type,
            description: self.schema.description().map(str::to_owned),
            schema: self.schema.to_json_schema(),
            is_periodic: action_type.is_periodic(),
        }
    }
}

impl std::fmt::Debug for RegisteredAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredAction")
            .field("id", &self.id)
            .field("action_type", &self.action_type())
            .finish_non_exhaustive()
    }
}

/// Derived, serializable view of a registered action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRegistryEntry {
    /// Action id.
    pub action_id: ActionId,
    /// Display name (`"pull_observations"` → `"Pull Observations"`).
    pub name: String,
    /// Classification.
    pub action_type: ActionType,
    /// Schema description, if any.
    pub description: Option<String>,
    /// JSON Schema of the action's configuration.
    pub schema: serde_json::Value,
    /// `true` iff the action is `pull_data`.
    pub is_periodic: bool,
}

/// Immutable table of registered actions, in registration order.
///
/// Built once with [`ActionRegistryBuilder`] and shared behind an `Arc`.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use weave_action::{ActionConfigSchema, ActionRegistry, ConfigSubtype, handler_fn};
///
/// let registry = ActionRegistry::builder()
///     .register(
///         "auth",
///         ActionConfigSchema::new("AuthenticateConfig", ConfigSubtype::Auth),
///         handler_fn(|_ctx, _cfg| async { Ok(json!({"valid_credentials": true})) }),
///     )
///     .unwrap()
///     .build();
///
/// assert!(registry.contains("auth"));
/// assert!(registry.get("unknown").is_err());
/// assert_eq!(registry.len(), 1);
/// ```
#[derive(Default)]
pub struct ActionRegistry {
    actions: IndexMap<ActionId, RegisteredAction>,
}

impl ActionRegistry {
    /// Start building a registry.
    pub fn builder() -> ActionRegistryBuilder {
        ActionRegistryBuilder::default()
    }

    /// Look up an action by id.
    pub fn get(&self, action_id: &str) -> Result<&RegisteredAction, RegistryError> {
        self.actions
            .get(action_id)
            .ok_or_else(|| RegistryError::UnknownAction(ActionId::new(action_id)))
    }

    /// Check whether an action id is registered.
    pub fn contains(&self, action_id: &str) -> bool {
        self.actions.contains_key(action_id)
    }

    /// Number of registered actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns `true` if no actions are registered.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Registered action ids in registration order.
    pub fn action_ids(&self) -> impl Iterator<Item = &ActionId> {
        self.actions.keys()
    }

    /// Iterate over registered actions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredAction> {
        self.actions.values()
    }

    /// Registry-facing projections of every action, in registration order.
    pub fn entries(&self) -> Vec<ActionRegistryEntry> {
        self.actions.values().map(RegisteredAction::entry).collect()
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("count", &self.actions.len())
            .field("ids", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Collects actions at startup. Consumed by [`build`](Self::build).
#[derive(Default, Debug)]
pub struct ActionRegistryBuilder {
    actions: IndexMap<ActionId, RegisteredAction>,
}

impl ActionRegistryBuilder {
    /// Register a handler and its schema under `id`.
    ///
    /// Fails on a duplicate id, or when a schema default violates its own
    /// field constraints.
    pub fn register(
        mut self,
        id: impl Into<ActionId>,
        schema: ActionConfigSchema,
        handler: impl ActionHandler,
    ) -> Result<Self, RegistryError> {
        self.insert(id.into(), schema, Arc::new(handler))?;
        Ok(self)
    }

    fn insert(
        &mut self,
        id: ActionId,
        schema: ActionConfigSchema,
        handler: Arc<dyn ActionHandler>,
    ) -> Result<(), RegistryError> {
        if self.actions.contains_key(&id) {
            return Err(RegistryError::DuplicateAction(id));
        }
        for field in schema.fields() {
            if let Some(default) = &field.default
                && let Some(kind) = config::check_value(field, default)
            {
                return Err(RegistryError::InvalidSchema {
                    action_id: id,
                    reason: format!("default of `{}`: {kind}", field.name),
                });
            }
        }
        tracing::debug!(action_id = %id, subtype = ?schema.subtype(), "registered action");
        self.actions.insert(
            id.clone(),
            RegisteredAction {
                id,
                schema: Arc::new(schema),
                handler,
            },
        );
        Ok(())
    }

    /// Freeze the registry.
    pub fn build(self) -> ActionRegistry {
        ActionRegistry {
            actions: self.actions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use crate::schema::{ConfigSubtype, FieldSpec};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn noop_schema(name: &str, subtype: ConfigSubtype) -> ActionConfigSchema {
        ActionConfigSchema::new(name, subtype)
    }

    fn registry() -> ActionRegistry {
        ActionRegistry::builder()
            .register(
                "auth",
                noop_schema("AuthenticateConfig", ConfigSubtype::Auth),
                handler_fn(|_, _| async { Ok(json!(true)) }),
            )
            .unwrap()
            .register(
                "pull_observations",
                noop_schema("PullObservationsConfig", ConfigSubtype::Pull)
                    .with_description("Pull observations")
                    .with_field(FieldSpec::integer("lookback_days").with_default(7)),
                handler_fn(|_, _| async { Ok(json!([])) }),
            )
            .unwrap()
            .register(
                "push_events",
                noop_schema("PushEventsConfig", ConfigSubtype::Push),
                handler_fn(|_, _| async { Ok(json!(null)) }),
            )
            .unwrap()
            .build()
    }

    #[test]
    fn empty_registry() {
        let reg = ActionRegistry::builder().build();
        assert!(reg.is_empty());
        assert_eq!(reg.len(), 0);
        assert!(matches!(
            reg.get("anything"),
            Err(RegistryError::UnknownAction(id)) if id.as_str() == "anything"
        ));
    }

    #[test]
    fn preserves_registration_order() {
        let reg = registry();
        let ids: Vec<&str> = reg.action_ids().map(ActionId::as_str).collect();
        assert_eq!(ids, vec!["auth", "pull_observations", "push_events"]);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let err = ActionRegistry::builder()
            .register(
                "auth",
                noop_schema("A", ConfigSubtype::Auth),
                handler_fn(|_, _| async { Ok(json!(1)) }),
            )
            .unwrap()
            .register(
                "auth",
                noop_schema("B", ConfigSubtype::Generic),
                handler_fn(|_, _| async { Ok(json!(2)) }),
            )
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateAction(ActionId::new("auth")));
    }

    #[test]
    fn invalid_default_is_rejected() {
        let schema = noop_schema("Bad", ConfigSubtype::Pull)
            .with_field(FieldSpec::integer("lookback_days").with_default("seven"));
        let err = ActionRegistry::builder()
            .register("pull", schema, handler_fn(|_, _| async { Ok(json!(1)) }))
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidSchema { .. }));
    }

    #[rstest]
    #[case(ConfigSubtype::Auth, "authentication", false)]
    #[case(ConfigSubtype::Pull, "pull_data", true)]
    #[case(ConfigSubtype::Push, "push_data", false)]
    #[case(ConfigSubtype::Generic, "generic", false)]
    fn classification_is_total(
        #[case] subtype: ConfigSubtype,
        #[case] wire: &str,
        #[case] periodic: bool,
    ) {
        let schema = noop_schema("S", subtype);
        assert_eq!(classify(&schema).as_str(), wire);
        assert_eq!(is_periodic(&schema), periodic);
    }

    #[test]
    fn entries_project_every_action() {
        let entries = registry().entries();
        assert_eq!(entries.len(), 3);

        let pull = &entries[1];
        assert_eq!(pull.name, "Pull Observations");
        assert_eq!(pull.action_type, ActionType::PullData);
        assert!(pull.is_periodic);
        assert_eq!(pull.description.as_deref(), Some("Pull observations"));
        assert_eq!(pull.schema["properties"]["lookback_days"]["default"], json!(7));

        for entry in &entries {
            assert_eq!(entry.is_periodic, entry.action_type == ActionType::PullData);
        }
    }

    #[test]
    fn debug_format() {
        let debug = format!("{:?}", registry());
        assert!(debug.contains("ActionRegistry"));
        assert!(debug.contains("count: 3"));
    }
}
