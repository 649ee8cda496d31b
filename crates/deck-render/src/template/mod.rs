//! Template evaluation over button specs.
//!
//! Strings containing `{{`, `{%` or `{#` are parsed with `deck-syntax` and
//! evaluated against a [`StateSnapshot`]. Evaluation never fails outwards: a
//! broken template renders as [`BUG_TEXT`] and is logged.

#![allow(missing_docs)]

mod eval;
mod functions;

use deck_syntax::{contains_template, parse_template};
use tracing::warn;

use crate::error::TemplateError;
use crate::state::StateSnapshot;
use crate::value::{Mapping, Value};

/// Text substituted for a template that failed to parse or evaluate.
pub const BUG_TEXT: &str = "#BUG";

/// Inputs available while evaluating one button's templates.
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    /// Live entity state.
    pub snapshot: &'a StateSnapshot,
    /// Entity bound to the `self_*` functions and the `entity_id` name.
    pub entity_id: Option<&'a str>,
}

impl<'a> TemplateContext<'a> {
    #[must_use]
    pub fn new(snapshot: &'a StateSnapshot, entity_id: Option<&'a str>) -> Self {
        Self {
            snapshot,
            entity_id,
        }
    }
}

/// Converts state text to its natural type: `"true"`/`"false"` to a bool,
/// then integer, then float; anything else stays a string.
#[must_use]
pub fn auto_cast(text: &str) -> Value {
    match text {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(number) = text.parse::<i64>() {
        return Value::Int(number);
    }
    // `nan` and `inf` stay text; NaN would never compare equal to itself.
    if let Some(number) = text.parse::<f64>().ok().filter(|number| number.is_finite()) {
        return Value::Float(number);
    }
    Value::String(text.to_string())
}

/// Evaluates a single template string, reporting failures.
pub fn evaluate(source: &str, ctx: &TemplateContext<'_>) -> Result<Value, TemplateError> {
    let template = parse_template(source)?;
    eval::evaluate_template(&template, ctx)
}

fn render_string(source: &str, ctx: &TemplateContext<'_>) -> Value {
    if !contains_template(source) {
        return Value::String(source.to_string());
    }
    evaluate(source, ctx).unwrap_or_else(|err| {
        warn!(template = source, entity_id = ctx.entity_id, error = %err, "template failed");
        Value::String(BUG_TEXT.to_string())
    })
}

/// Renders every template string inside `value`, keeping its structure.
#[must_use]
pub fn render_template(value: &Value, snapshot: &StateSnapshot, entity_id: Option<&str>) -> Value {
    render_value(value, &TemplateContext::new(snapshot, entity_id))
}

/// Renders every template inside a button spec.
#[must_use]
pub fn render_mapping(map: &Mapping, snapshot: &StateSnapshot, entity_id: Option<&str>) -> Mapping {
    let ctx = TemplateContext::new(snapshot, entity_id);
    map.iter()
        .map(|(key, item)| (key.clone(), render_value(item, &ctx)))
        .collect()
}

fn render_value(value: &Value, ctx: &TemplateContext<'_>) -> Value {
    match value {
        Value::String(source) => render_string(source, ctx),
        Value::Sequence(items) => {
            Value::Sequence(items.iter().map(|item| render_value(item, ctx)).collect())
        }
        Value::Mapping(map) => Value::Mapping(
            map.iter()
                .map(|(key, item)| (key.clone(), render_value(item, ctx)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Returns `true` when any string inside `value` contains a template.
#[must_use]
pub fn has_template(value: &Value) -> bool {
    match value {
        Value::String(text) => contains_template(text),
        Value::Sequence(items) => items.iter().any(has_template),
        Value::Mapping(map) => map.values().any(has_template),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::EntityState;
    use serde_json::json;

    fn snapshot() -> StateSnapshot {
        StateSnapshot::new()
            .with_entity(
                "sensor.temp",
                EntityState::new("21.5").with_attribute("unit_of_measurement", "°C"),
            )
            .with_entity("sensor.flag", EntityState::new("true"))
            .with_entity("sensor.gone", EntityState::new("unavailable"))
            .with_entity(
                "light.kitchen",
                EntityState::new("on")
                    .with_attribute("friendly_name", "Kitchen")
                    .with_attribute("brightness", "128"),
            )
    }

    fn eval(source: &str, entity_id: Option<&str>) -> Value {
        let snapshot = snapshot();
        render_template(&Value::from(source), &snapshot, entity_id)
    }

    #[test]
    fn auto_cast_natural_types() {
        assert_eq!(auto_cast("21.5"), Value::Float(21.5));
        assert_eq!(auto_cast("42"), Value::Int(42));
        assert_eq!(auto_cast("true"), Value::Bool(true));
        assert_eq!(auto_cast("True"), Value::from("True"));
        assert_eq!(auto_cast("on"), Value::from("on"));
        assert_eq!(auto_cast("nan"), Value::from("nan"));
        assert_eq!(auto_cast("inf"), Value::from("inf"));
        assert_eq!(auto_cast("-Infinity"), Value::from("-Infinity"));
    }

    #[test]
    fn states_are_typed() {
        assert_eq!(eval("{{ states('sensor.temp') }}", None), Value::Float(21.5));
        assert_eq!(eval("{{ states('sensor.flag') }}", None), Value::Bool(true));
        assert_eq!(eval("{{ states('sensor.gone') }}", None), Value::from(""));
        assert_eq!(eval("{{ states('sensor.missing') }}", None), Value::Null);
    }

    #[test]
    fn states_options() {
        assert_eq!(
            eval("{{ states('sensor.temp', with_unit=true) }}", None),
            Value::from("21.5 °C")
        );
        assert_eq!(eval("{{ states('sensor.temp', rounded=true) }}", None), Value::Int(22));
    }

    #[test]
    fn self_functions_use_bound_entity() {
        assert_eq!(eval("{{ self_states() }}", Some("sensor.temp")), Value::Float(21.5));
        assert_eq!(
            eval("{{ self_binary_text('On', 'Off') }}", Some("light.kitchen")),
            Value::from("On")
        );
        assert_eq!(
            eval("{{ self_state_attr('brightness') }}", Some("light.kitchen")),
            Value::Int(128)
        );
        assert_eq!(eval("{{ self_is_state('on') }}", Some("light.kitchen")), Value::Bool(true));
        assert_eq!(eval("{{ entity_id }}", Some("light.kitchen")), Value::from("light.kitchen"));
    }

    #[test]
    fn mixed_text_is_trimmed_and_cast() {
        assert_eq!(eval("Temp: {{ states('sensor.temp') }}", None), Value::from("Temp: 21.5"));
        assert_eq!(eval("  {{ 20 }}{{ 1 }} ", None), Value::Int(201));
    }

    #[test]
    fn block_tags_choose_a_branch() {
        let source = "{% if is_state('light.kitchen', 'on') %}lit{% else %}dark{% endif %}";
        assert_eq!(eval(source, None), Value::from("lit"));
    }

    #[test]
    fn filters_and_operators() {
        assert_eq!(eval("{{ states('sensor.temp') | round }}", None), Value::Float(22.0));
        assert_eq!(eval("{{ 7 / 2 }}", None), Value::Float(3.5));
        assert_eq!(eval("{{ -7 % 3 }}", None), Value::Int(2));
        assert_eq!(eval("{{ 'kitchen light' | title }}", None), Value::from("Kitchen Light"));
        assert_eq!(eval("{{ states('sensor.none') | default('n/a') }}", None), Value::from("n/a"));
        assert_eq!(eval("{{ 'a' ~ 1 }}", None), Value::from("a1"));
        assert_eq!(eval("{{ 'x' in ['x', 'y'] }}", None), Value::Bool(true));
    }

    #[test]
    fn failures_become_bug_text() {
        assert_eq!(eval("{{ nope() }}", None), Value::from(BUG_TEXT));
        assert_eq!(eval("{{ 1 + }}", None), Value::from(BUG_TEXT));
        assert_eq!(eval("{{ 1 / 0 }}", None), Value::from(BUG_TEXT));
        assert_eq!(eval("{{ 1.0e308 * 10.0 }}", None), Value::from(BUG_TEXT));
        assert_eq!(eval("{{ x | shout }}", None), Value::from(BUG_TEXT));
    }

    #[test]
    fn structure_is_preserved() {
        let snapshot = snapshot();
        let spec = Value::from(json!({
            "name": "{{ state_attr('light.kitchen', 'friendly_name') }}",
            "icon": "mdi:lightbulb",
            "list": ["{{ 1 + 1 }}", 3],
        }));
        let rendered = render_template(&spec, &snapshot, None);
        assert_eq!(
            rendered,
            Value::from(json!({"name": "Kitchen", "icon": "mdi:lightbulb", "list": [2, 3]}))
        );
    }

    #[test]
    fn detects_nested_templates() {
        assert!(has_template(&Value::from(json!({"a": [{"b": "{# c #}"}]}))));
        assert!(!has_template(&Value::from(json!({"a": ["plain", 1]}))));
    }
}
