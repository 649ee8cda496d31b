//! Semi-structured values for button specs, presets and entity attributes.

#![allow(missing_docs)]

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Ordered mapping used for every nested fragment.
///
/// Equality ignores key order, so two fragments that only differ in the order
/// keys were merged compare equal.
pub type Mapping = IndexMap<SmolStr, Value>;

/// Configuration/state value: null, bool, number, string, sequence or mapping.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Explicit absence. Ignored by merges unless nulls are allowed.
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Sequence(Vec<Value>),
    Mapping(Mapping),
}

impl Value {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Numeric view: integers widen to floats.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Truthiness as used by templates and flags such as `is_dynamic`.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(value) => *value,
            Self::Int(value) => *value != 0,
            Self::Float(value) => *value != 0.0,
            Self::String(text) => !text.is_empty(),
            Self::Sequence(items) => !items.is_empty(),
            Self::Mapping(map) => !map.is_empty(),
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
        }
    }

    /// Text shown on a button or produced by template interpolation.
    #[must_use]
    pub fn to_display_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(value) => value.to_string(),
            Self::Int(value) => value.to_string(),
            Self::Float(value) => format_float(*value),
            Self::String(text) => text.clone(),
            Self::Sequence(_) | Self::Mapping(_) => serde_json::to_string(self).unwrap_or_default(),
        }
    }
}

/// Formats a float so whole numbers keep a trailing `.0`.
#[must_use]
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Mapping> for Value {
    fn from(value: Mapping) -> Self {
        Self::Mapping(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::Sequence(value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(value) => Self::Bool(value),
            serde_json::Value::Number(number) => number
                .as_i64()
                .map(Self::Int)
                .or_else(|| number.as_f64().map(Self::Float))
                .unwrap_or(Self::Null),
            serde_json::Value::String(text) => Self::String(text),
            serde_json::Value::Array(items) => {
                Self::Sequence(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => Self::Mapping(
                map.into_iter()
                    .map(|(key, value)| (SmolStr::new(key), Self::from(value)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_numbers_keep_integer_precision() {
        assert_eq!(Value::from(json!(3)), Value::Int(3));
        assert_eq!(Value::from(json!(21.5)), Value::Float(21.5));
    }

    #[test]
    fn mapping_equality_ignores_key_order() {
        let a = Value::from(json!({"name": "A", "icon": "mdi:home"}));
        let b = Value::from(json!({"icon": "mdi:home", "name": "A"}));
        assert_eq!(a, b);
    }

    #[test]
    fn deserializes_untagged_from_toml() {
        let value: Value = toml::from_str("name = 'Lamp'\nlevel = 3\nratio = 0.5\nflags = [true]")
            .unwrap();
        let map = value.as_mapping().unwrap();
        assert_eq!(map["name"], Value::from("Lamp"));
        assert_eq!(map["level"], Value::Int(3));
        assert_eq!(map["ratio"], Value::Float(0.5));
        assert_eq!(map["flags"], Value::Sequence(vec![Value::Bool(true)]));
    }

    #[test]
    fn display_text_of_scalars() {
        assert_eq!(Value::Null.to_display_text(), "");
        assert_eq!(Value::Float(21.0).to_display_text(), "21.0");
        assert_eq!(Value::Float(21.5).to_display_text(), "21.5");
        assert_eq!(Value::Bool(true).to_display_text(), "true");
    }

    #[test]
    fn truthiness() {
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("off").is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Mapping(Mapping::new()).is_truthy());
    }
}
