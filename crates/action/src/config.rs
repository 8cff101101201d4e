//! Override validation and configuration resolution.
//!
//! Resolution layers, lowest precedence first:
//!
//! 1. schema defaults,
//! 2. the integration's stored base configuration,
//! 3. caller-supplied overrides.
//!
//! Overrides are validated strictly: unknown keys and wrong types are
//! rejected, never coerced. Stored base keys the schema no longer declares
//! are dropped with a warning.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ConfigValidationError, FieldViolation, ViolationKind};
use crate::id::ActionId;
use crate::schema::{ActionConfigSchema, FieldSpec};

/// Field name → value mapping used for overrides and stored configuration.
pub type ConfigMap = serde_json::Map<String, Value>;

/// Check caller overrides against `schema` without merging anything.
///
/// Every key must be declared and every value must satisfy the field's type
/// and constraints. `null` is accepted only for optional fields. Required
/// fields are not checked here; they may come from stored configuration.
pub fn validate_overrides(
    action_id: &ActionId,
    schema: &ActionConfigSchema,
    overrides: &ConfigMap,
) -> Result<(), ConfigValidationError> {
    let mut violations = Vec::new();
    for (key, value) in overrides {
        match schema.field(key) {
            None => violations.push(FieldViolation::new(key, ViolationKind::UnknownField)),
            Some(field) => {
                if let Some(kind) = check_value(field, value) {
                    violations.push(FieldViolation::new(key, kind));
                }
            }
        }
    }
    finish(action_id, violations)
}

/// Merge defaults, stored configuration and overrides, then validate the
/// result.
pub fn resolve(
    action_id: &ActionId,
    schema: &ActionConfigSchema,
    base: Option<&ConfigMap>,
    overrides: &ConfigMap,
) -> Result<ResolvedActionConfig, ConfigValidationError> {
    validate_overrides(action_id, schema, overrides)?;

    let mut values = schema.defaults();
    if let Some(base) = base {
        for (key, value) in base {
            if schema.field(key).is_some() {
                values.insert(key.clone(), value.clone());
            } else {
                tracing::warn!(
                    action_id = %action_id,
                    field = %key,
                    "dropping stored configuration key not declared by schema"
                );
            }
        }
    }
    for (key, value) in overrides {
        values.insert(key.clone(), value.clone());
    }

    let mut violations = Vec::new();
    for field in schema.fields() {
        match values.get(&field.name) {
            None | Some(Value::Null) if field.required => {
                violations.push(FieldViolation::new(&field.name, ViolationKind::Missing));
            }
            Some(value) => {
                if let Some(kind) = check_value(field, value) {
                    violations.push(FieldViolation::new(&field.name, kind));
                }
            }
            None => {}
        }
    }
    finish(action_id, violations)?;

    Ok(ResolvedActionConfig {
        action_id: action_id.clone(),
        values,
    })
}

fn finish(
    action_id: &ActionId,
    violations: Vec<FieldViolation>,
) -> Result<(), ConfigValidationError> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ConfigValidationError {
            action_id: action_id.clone(),
            violations,
        })
    }
}

/// Check one value against a field declaration.
pub(crate) fn check_value(field: &FieldSpec, value: &Value) -> Option<ViolationKind> {
    if value.is_null() {
        return field.required.then(|| ViolationKind::TypeMismatch {
            expected: field.field_type.to_string(),
            found: "null".into(),
        });
    }
    if !field.field_type.accepts(value) {
        return Some(ViolationKind::TypeMismatch {
            expected: field.field_type.to_string(),
            found: json_kind(value).into(),
        });
    }
    if let Some(n) = value.as_f64() {
        let below = field.minimum.is_some_and(|min| n < min);
        let above = field.maximum.is_some_and(|max| n > max);
        if below || above {
            return Some(ViolationKind::OutOfRange);
        }
    }
    if let Some(s) = value.as_str() {
        let len = s.chars().count();
        let short = field.min_length.is_some_and(|min| len < min);
        let long = field.max_length.is_some_and(|max| len > max);
        if short || long {
            return Some(ViolationKind::Length);
        }
    }
    if let Some(allowed) = &field.allowed
        && !allowed.contains(value)
    {
        return Some(ViolationKind::NotAllowed);
    }
    None
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Fully merged and validated configuration for one execution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedActionConfig {
    action_id: ActionId,
    values: ConfigMap,
}

impl ResolvedActionConfig {
    /// Action this configuration was resolved for.
    pub fn action_id(&self) -> &ActionId {
        &self.action_id
    }

    /// Raw value of a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Integer value of a field.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.values.get(key).and_then(Value::as_i64)
    }

    /// String value of a field.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Boolean value of a field.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(Value::as_bool)
    }

    /// All merged values.
    pub fn values(&self) -> &ConfigMap {
        &self.values
    }

    /// Consume and return the merged values.
    pub fn into_values(self) -> ConfigMap {
        self.values
    }

    /// Deserialize into a handler-specific struct.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.values.clone()))
    }
}
