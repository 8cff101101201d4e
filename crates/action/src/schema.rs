//! Declarative configuration schemas for actions.
//!
//! An [`ActionConfigSchema`] lists the fields an action accepts, their types,
//! constraints and defaults. It is immutable once built and is the single
//! source for both validation ([`crate::config`]) and the JSON Schema document
//! published to the integration registry.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::metadata::humanize;

/// Explicit subtype marker attached to each schema.
///
/// Exactly one marker per schema, so classification is a total function of
/// the schema. Variants are listed in classification precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSubtype {
    /// Authentication / credential check.
    Auth,
    /// Data pull from the remote system.
    Pull,
    /// Data push to the remote system.
    Push,
    /// Generic operation.
    Generic,
}

/// Value type of a configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// UTF-8 string.
    String,
    /// Whole number. Floats such as `3.0` are rejected.
    Integer,
    /// Any JSON number.
    Number,
    /// `true` / `false`.
    Boolean,
    /// RFC 3339 timestamp carried as a string.
    DateTime,
    /// JSON array.
    Array,
    /// JSON object.
    Object,
}

impl FieldType {
    /// Whether `value` has this type. `null` never matches.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::DateTime => value
                .as_str()
                .is_some_and(|s| chrono::DateTime::parse_from_rfc3339(s).is_ok()),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }

    /// JSON Schema `type` keyword for this field type.
    const fn json_type(self) -> &'static str {
        match self {
            Self::String | Self::DateTime => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::DateTime => "datetime",
            Self::Array => "array",
            Self::Object => "object",
        };
        f.write_str(name)
    }
}

/// Declaration of a single configuration field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field key as it appears in configuration maps.
    pub name: String,
    /// Declared value type.
    pub field_type: FieldType,
    /// Whether a non-null value must be present after merging.
    pub required: bool,
    /// Value used when neither stored config nor overrides provide one.
    pub default: Option<Value>,
    /// Human description shown in the registry UI.
    pub description: Option<String>,
    /// Inclusive lower bound for numeric fields.
    pub minimum: Option<f64>,
    /// Inclusive upper bound for numeric fields.
    pub maximum: Option<f64>,
    /// Minimum character count for string fields.
    pub min_length: Option<usize>,
    /// Maximum character count for string fields.
    pub max_length: Option<usize>,
    /// Closed set of accepted values.
    pub allowed: Option<Vec<Value>>,
}

impl FieldSpec {
    /// Create an optional field of the given type with no constraints.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            default: None,
            description: None,
            minimum: None,
            maximum: None,
            min_length: None,
            max_length: None,
            allowed: None,
        }
    }

    /// Shorthand for a [`FieldType::String`] field.
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    /// Shorthand for a [`FieldType::Integer`] field.
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Integer)
    }

    /// Shorthand for a [`FieldType::Number`] field.
    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Number)
    }

    /// Shorthand for a [`FieldType::Boolean`] field.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    /// Shorthand for a [`FieldType::DateTime`] field.
    pub fn datetime(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::DateTime)
    }

    /// Shorthand for a [`FieldType::Array`] field.
    pub fn array(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Array)
    }

    /// Shorthand for a [`FieldType::Object`] field.
    pub fn object(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Object)
    }

    /// Mark the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the default value.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set an inclusive lower bound.
    pub fn with_minimum(mut self, minimum: f64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    /// Set an inclusive upper bound.
    pub fn with_maximum(mut self, maximum: f64) -> Self {
        self.maximum = Some(maximum);
        self
    }

    /// Set the minimum string length.
    pub fn with_min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    /// Set the maximum string length.
    pub fn with_max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Restrict the field to a closed set of values.
    pub fn with_allowed<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.allowed = Some(values.into_iter().map(Into::into).collect());
        self
    }

    fn to_json_schema(&self) -> Value {
        let mut prop = Map::new();
        prop.insert("title".into(), json!(humanize(&self.name)));
        prop.insert("type".into(), json!(self.field_type.json_type()));
        if self.field_type == FieldType::DateTime {
            prop.insert("format".into(), json!("date-time"));
        }
        if let Some(description) = &self.description {
            prop.insert("description".into(), json!(description));
        }
        if let Some(default) = &self.default {
            prop.insert("default".into(), default.clone());
        }
        if let Some(minimum) = self.minimum {
            prop.insert("minimum".into(), json!(minimum));
        }
        if let Some(maximum) = self.maximum {
            prop.insert("maximum".into(), json!(maximum));
        }
        if let Some(min) = self.min_length {
            prop.insert("minLength".into(), json!(min));
        }
        if let Some(max) = self.max_length {
            prop.insert("maxLength".into(), json!(max));
        }
        if let Some(allowed) = &self.allowed {
            prop.insert("enum".into(), Value::Array(allowed.clone()));
        }
        Value::Object(prop)
    }
}

/// Structural description of one action's configuration.
///
/// # Example
///
/// ```rust
/// use weave_action::{ActionConfigSchema, ConfigSubtype, FieldSpec};
///
/// let schema = ActionConfigSchema::new("PullObservationsConfig", ConfigSubtype::Pull)
///     .with_field(FieldSpec::integer("lookback_days").with_default(7).with_minimum(1.0));
///
/// assert_eq!(schema.fields().count(), 1);
/// assert_eq!(schema.to_json_schema()["properties"]["lookback_days"]["type"], "integer");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ActionConfigSchema {
    name: String,
    version: u32,
    subtype: ConfigSubtype,
    description: Option<String>,
    fields: IndexMap<String, FieldSpec>,
}

impl ActionConfigSchema {
    /// Create an empty schema at version 1.
    pub fn new(name: impl Into<String>, subtype: ConfigSubtype) -> Self {
        Self {
            name: name.into(),
            version: 1,
            subtype,
            description: None,
            fields: IndexMap::new(),
        }
    }

    /// Set the schema version.
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declare a field. A later field with the same name replaces the earlier one.
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    /// Schema name (used as the JSON Schema `title`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Schema version.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Subtype marker.
    pub fn subtype(&self) -> ConfigSubtype {
        self.subtype
    }

    /// Optional description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Look up a field declaration.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    /// Declared fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.values()
    }

    /// Map of every field that declares a default.
    pub fn defaults(&self) -> Map<String, Value> {
        self.fields
            .values()
            .filter_map(|f| f.default.clone().map(|d| (f.name.clone(), d)))
            .collect()
    }

    /// Render the schema as a JSON Schema object document.
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .values()
            .map(|f| (f.name.clone(), f.to_json_schema()))
            .collect();
        let required: Vec<&str> = self
            .fields
            .values()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect();

        let mut doc = Map::new();
        doc.insert("title".into(), json!(self.name));
        if let Some(description) = &self.description {
            doc.insert("description".into(), json!(description));
        }
        doc.insert("type".into(), json!("object"));
        doc.insert("properties".into(), Value::Object(properties));
        if !required.is_empty() {
            doc.insert("required".into(), json!(required));
        }
        Value::Object(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn pull_schema() -> ActionConfigSchema {
        ActionConfigSchema::new("PullObservationsConfig", ConfigSubtype::Pull)
            .with_description("Observation pull settings")
            .with_field(
                FieldSpec::integer("lookback_days")
                    .with_default(7)
                    .with_minimum(1.0)
                    .with_description("Days of history"),
            )
            .with_field(FieldSpec::datetime("start_datetime").required())
            .with_field(FieldSpec::string("mode").with_allowed(["fast", "full"]))
    }

    #[rstest]
    #[case(FieldType::String, json!("x"), true)]
    #[case(FieldType::String, json!(1), false)]
    #[case(FieldType::Integer, json!(3), true)]
    #[case(FieldType::Integer, json!(3.0), false)]
    #[case(FieldType::Integer, json!("two"), false)]
    #[case(FieldType::Number, json!(3.5), true)]
    #[case(FieldType::Number, json!(3), true)]
    #[case(FieldType::Boolean, json!(false), true)]
    #[case(FieldType::Boolean, json!("true"), false)]
    #[case(FieldType::DateTime, json!("2024-12-01T00:00:00Z"), true)]
    #[case(FieldType::DateTime, json!("yesterday"), false)]
    #[case(FieldType::Array, json!([1, 2]), true)]
    #[case(FieldType::Object, json!({"a": 1}), true)]
    #[case(FieldType::Object, Value::Null, false)]
    fn field_type_acceptance(#[case] ty: FieldType, #[case] value: Value, #[case] ok: bool) {
        assert_eq!(ty.accepts(&value), ok);
    }

    #[test]
    fn defaults_only_include_declared_defaults() {
        let defaults = pull_schema().defaults();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults["lookback_days"], json!(7));
    }

    #[test]
    fn json_schema_document() {
        let doc = pull_schema().to_json_schema();
        assert_eq!(
            doc,
            json!({
                "title": "PullObservationsConfig",
                "description": "Observation pull settings",
                "type": "object",
                "properties": {
                    "lookback_days": {
                        "title": "Lookback Days",
                        "type": "integer",
                        "description": "Days of history",
                        "default": 7,
                        "minimum": 1.0
                    },
                    "start_datetime": {
                        "title": "Start Datetime",
                        "type": "string",
                        "format": "date-time"
                    },
                    "mode": {
                        "title": "Mode",
                        "type": "string",
                        "enum": ["fast", "full"]
                    }
                },
                "required": ["start_datetime"]
            })
        );
    }

    #[test]
    fn json_schema_omits_empty_required() {
        let doc = ActionConfigSchema::new("Empty", ConfigSubtype::Generic).to_json_schema();
        assert!(doc.get("required").is_none());
        assert_eq!(doc["properties"], json!({}));
    }

    #[test]
    fn later_field_replaces_earlier() {
        let schema = ActionConfigSchema::new("S", ConfigSubtype::Generic)
            .with_field(FieldSpec::string("x"))
            .with_field(FieldSpec::integer("x"));
        assert_eq!(schema.fields().count(), 1);
        assert_eq!(schema.field("x").unwrap().field_type, FieldType::Integer);
    }
}
