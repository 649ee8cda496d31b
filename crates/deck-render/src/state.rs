//! Read-only snapshot of external entity state.

#![allow(missing_docs)]

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer};
use smol_str::SmolStr;

use crate::error::ConfigError;
use crate::value::{Mapping, Value};

/// State of a single entity as reported by the state provider.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct EntityState {
    /// Raw state text, e.g. `"on"`, `"21.5"` or `"unavailable"`.
    #[serde(deserialize_with = "state_text")]
    pub state: String,
    /// Entity attributes such as `friendly_name`, `icon` and
    /// `unit_of_measurement`.
    #[serde(default)]
    pub attributes: Mapping,
}

impl EntityState {
    #[must_use]
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            attributes: Mapping::new(),
        }
    }

    /// Adds an attribute, builder style.
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(SmolStr::new(name), value.into());
        self
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }
}

fn state_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|value| value.to_display_text())
}

/// Entity id -> state map, swapped wholesale by callers between renders.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StateSnapshot {
    entities: FxHashMap<SmolStr, EntityState>,
}

#[derive(Deserialize)]
struct EntityRecord {
    entity_id: SmolStr,
    #[serde(flatten)]
    state: EntityState,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotDocument {
    List(Vec<EntityRecord>),
    Map(IndexMap<SmolStr, EntityState>),
}

impl StateSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses either a `[{entity_id, state, attributes}]` list or an
    /// `{entity_id: {state, attributes}}` map.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let document: SnapshotDocument = serde_json::from_str(text)
            .map_err(|err| ConfigError::Parse(format!("state snapshot: {err}").into()))?;
        let entities = match document {
            SnapshotDocument::List(records) => records
                .into_iter()
                .map(|record| (record.entity_id, record.state))
                .collect(),
            SnapshotDocument::Map(map) => map.into_iter().collect(),
        };
        Ok(Self { entities })
    }

    /// Adds or replaces an entity, builder style.
    #[must_use]
    pub fn with_entity(mut self, entity_id: &str, state: EntityState) -> Self {
        self.insert(entity_id, state);
        self
    }

    pub fn insert(&mut self, entity_id: &str, state: EntityState) -> Option<EntityState> {
        self.entities.insert(SmolStr::new(entity_id), state)
    }

    /// Replaces only the state text of an existing entity, keeping its
    /// attributes. Unknown entities are created without attributes.
    pub fn set_state(&mut self, entity_id: &str, state: impl Into<String>) {
        self.entities
            .entry(SmolStr::new(entity_id))
            .or_default()
            .state = state.into();
    }

    #[must_use]
    pub fn get(&self, entity_id: &str) -> Option<&EntityState> {
        self.entities.get(entity_id)
    }

    #[must_use]
    pub fn contains(&self, entity_id: &str) -> bool {
        self.entities.contains_key(entity_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SmolStr, &EntityState)> {
        self.entities.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hub_state_list() {
        let snapshot = StateSnapshot::from_json_str(
            r#"[{"entity_id": "sensor.temp", "state": "21.5",
                 "attributes": {"unit_of_measurement": "°C"}}]"#,
        )
        .unwrap();
        let temp = snapshot.get("sensor.temp").unwrap();
        assert_eq!(temp.state, "21.5");
        assert_eq!(temp.attribute("unit_of_measurement"), Some(&Value::from("°C")));
    }

    #[test]
    fn parses_id_map_with_non_string_state() {
        let snapshot =
            StateSnapshot::from_json_str(r#"{"light.kitchen": {"state": "on"}, "sensor.n": {"state": 3}}"#)
                .unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("sensor.n").unwrap().state, "3");
        assert!(snapshot.get("light.kitchen").unwrap().attributes.is_empty());
    }

    #[test]
    fn rejects_other_shapes() {
        let err = StateSnapshot::from_json_str("42").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn set_state_keeps_attributes() {
        let mut snapshot = StateSnapshot::new().with_entity(
            "light.kitchen",
            EntityState::new("off").with_attribute("friendly_name", "Kitchen"),
        );
        snapshot.set_state("light.kitchen", "on");
        let kitchen = snapshot.get("light.kitchen").unwrap();
        assert_eq!(kitchen.state, "on");
        assert_eq!(kitchen.attribute("friendly_name"), Some(&Value::from("Kitchen")));
    }
}
