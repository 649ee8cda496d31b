//! Entity lookup functions and filters available to templates.

use smol_str::SmolStr;

use crate::error::TemplateError;
use crate::state::EntityState;
use crate::value::Value;

use super::eval::{values_equal, EvaluatedArgs};
use super::{auto_cast, TemplateContext};

const UNAVAILABLE: &str = "unavailable";
const UNIT_ATTRIBUTE: &str = "unit_of_measurement";

/// Binds evaluated arguments to named parameters, Python style.
fn bind(
    name: &str,
    params: &[&str],
    args: EvaluatedArgs,
) -> Result<Vec<Option<Value>>, TemplateError> {
    let error = |message: String| TemplateError::Arguments {
        name: SmolStr::new(name),
        message: message.into(),
    };
    if args.positional.len() > params.len() {
        return Err(error(format!(
            "expected at most {} arguments, got {}",
            params.len(),
            args.positional.len()
        )));
    }
    let mut bound: Vec<Option<Value>> = vec![None; params.len()];
    for (slot, value) in bound.iter_mut().zip(args.positional) {
        *slot = Some(value);
    }
    for (key, value) in args.keyword {
        let index = params
            .iter()
            .position(|param| *param == key)
            .ok_or_else(|| error(format!("unexpected keyword argument '{key}'")))?;
        if bound[index].is_some() {
            return Err(error(format!("multiple values for argument '{key}'")));
        }
        bound[index] = Some(value);
    }
    Ok(bound)
}

fn required(name: &str, param: &str, value: Option<Value>) -> Result<Value, TemplateError> {
    value.ok_or_else(|| TemplateError::Arguments {
        name: SmolStr::new(name),
        message: format!("missing required argument '{param}'").into(),
    })
}

fn flag(value: Option<Value>) -> bool {
    value.is_some_and(|value| value.is_truthy())
}

fn entity_arg(name: &str, value: Value) -> Result<String, TemplateError> {
    match value {
        Value::String(entity_id) => Ok(entity_id),
        other => Err(TemplateError::Arguments {
            name: SmolStr::new(name),
            message: format!("entity id must be a string, got {}", other.type_name()).into(),
        }),
    }
}

/// Calls a template function by name.
pub(crate) fn call_function(
    name: &str,
    args: EvaluatedArgs,
    ctx: &TemplateContext<'_>,
) -> Result<Value, TemplateError> {
    let own = ctx.entity_id.unwrap_or_default();
    match name {
        "states" => {
            let [entity_id, with_unit, rounded] =
                bind_array(name, &["entity_id", "with_unit", "rounded"], args)?;
            let entity_id = entity_arg(name, required(name, "entity_id", entity_id)?)?;
            Ok(states(ctx, &entity_id, flag(with_unit), flag(rounded)))
        }
        "self_states" => {
            let [with_unit, rounded] = bind_array(name, &["with_unit", "rounded"], args)?;
            Ok(states(ctx, own, flag(with_unit), flag(rounded)))
        }
        "state_attr" => {
            let [entity_id, attr] = bind_array(name, &["entity_id", "attr"], args)?;
            let entity_id = entity_arg(name, required(name, "entity_id", entity_id)?)?;
            let attr = required(name, "attr", attr)?;
            Ok(state_attr(ctx, &entity_id, &attr))
        }
        "self_state_attr" => {
            let [attr] = bind_array(name, &["attr"], args)?;
            let attr = required(name, "attr", attr)?;
            Ok(state_attr(ctx, own, &attr))
        }
        "is_state" => {
            let [entity_id, state] = bind_array(name, &["entity_id", "state"], args)?;
            let entity_id = entity_arg(name, required(name, "entity_id", entity_id)?)?;
            let state = required(name, "state", state)?;
            Ok(Value::Bool(is_state(ctx, &entity_id, &state)))
        }
        "self_is_state" => {
            let [state] = bind_array(name, &["state"], args)?;
            let state = required(name, "state", state)?;
            Ok(Value::Bool(is_state(ctx, own, &state)))
        }
        "binary_text" => {
            let [entity_id, on_text, off_text] =
                bind_array(name, &["entity_id", "on_text", "off_text"], args)?;
            let entity_id = entity_arg(name, required(name, "entity_id", entity_id)?)?;
            let on_text = required(name, "on_text", on_text)?;
            let off_text = required(name, "off_text", off_text)?;
            Ok(binary_text(ctx, &entity_id, on_text, off_text))
        }
        "self_binary_text" => {
            let [on_text, off_text] = bind_array(name, &["on_text", "off_text"], args)?;
            let on_text = required(name, "on_text", on_text)?;
            let off_text = required(name, "off_text", off_text)?;
            Ok(binary_text(ctx, own, on_text, off_text))
        }
        _ => Err(TemplateError::UnknownFunction(SmolStr::new(name))),
    }
}

fn bind_array<const N: usize>(
    name: &str,
    params: &[&str; N],
    args: EvaluatedArgs,
) -> Result<[Option<Value>; N], TemplateError> {
    let bound = bind(name, params, args)?;
    let mut out: [Option<Value>; N] = std::array::from_fn(|_| None);
    for (slot, value) in out.iter_mut().zip(bound) {
        *slot = value;
    }
    Ok(out)
}

fn no_args(name: &str, args: EvaluatedArgs) -> Result<(), TemplateError> {
    bind(name, &[], args).map(drop)
}

fn lookup<'a>(ctx: &TemplateContext<'a>, entity_id: &str) -> Option<&'a EntityState> {
    ctx.snapshot.get(entity_id)
}

/// Current state of an entity: null when unknown, `""` when unavailable,
/// otherwise auto-cast.
fn states(ctx: &TemplateContext<'_>, entity_id: &str, with_unit: bool, rounded: bool) -> Value {
    let Some(entity) = lookup(ctx, entity_id) else {
        return Value::Null;
    };
    if entity.state == UNAVAILABLE {
        return Value::String(String::new());
    }
    let mut state = auto_cast(&entity.state);
    if rounded {
        if let Value::Float(number) = state {
            state = round_to_int(number);
        }
    }
    if with_unit {
        if let Some(unit) = entity.attribute(UNIT_ATTRIBUTE).filter(|unit| unit.is_truthy()) {
            state = Value::String(format!(
                "{} {}",
                state.to_display_text(),
                unit.to_display_text()
            ));
        }
    }
    state
}

#[allow(clippy::cast_possible_truncation)]
fn round_to_int(number: f64) -> Value {
    let rounded = number.round();
    if rounded.is_finite() && rounded.abs() < 9.0e18 {
        Value::Int(rounded as i64)
    } else {
        Value::Float(rounded)
    }
}

fn state_attr(ctx: &TemplateContext<'_>, entity_id: &str, attr: &Value) -> Value {
    let Some(attr) = attr.as_str() else {
        return Value::Null;
    };
    match lookup(ctx, entity_id).and_then(|entity| entity.attribute(attr)) {
        Some(Value::String(text)) => auto_cast(text),
        Some(other) => other.clone(),
        None => Value::Null,
    }
}

fn is_state(ctx: &TemplateContext<'_>, entity_id: &str, expected: &Value) -> bool {
    let expected = match expected {
        Value::String(text) => auto_cast(text),
        other => other.clone(),
    };
    values_equal(&states(ctx, entity_id, false, false), &expected)
}

fn binary_text(ctx: &TemplateContext<'_>, entity_id: &str, on_text: Value, off_text: Value) -> Value {
    if is_state(ctx, entity_id, &Value::from("on")) {
        on_text
    } else {
        off_text
    }
}

/// Applies a filter (`value | name(args)`).
pub(crate) fn apply_filter(
    name: &str,
    input: Value,
    args: EvaluatedArgs,
) -> Result<Value, TemplateError> {
    match name {
        "round" => {
            let [precision] = bind_array(name, &["precision"], args)?;
            let precision = match precision {
                None => 0,
                Some(Value::Int(digits)) => digits,
                Some(other) => {
                    return Err(TemplateError::Type(
                        format!("round precision must be an int, got {}", other.type_name()).into(),
                    ))
                }
            };
            let number = input.as_f64().ok_or_else(|| {
                TemplateError::Type(format!("cannot round {}", input.type_name()).into())
            })?;
            let factor = 10f64.powi(i32::try_from(precision.clamp(-15, 15)).unwrap_or(0));
            Ok(Value::Float((number * factor).round() / factor))
        }
        "int" => {
            no_args(name, args)?;
            Ok(to_int(&input))
        }
        "float" => {
            no_args(name, args)?;
            Ok(to_float(&input))
        }
        "string" => {
            no_args(name, args)?;
            Ok(Value::String(input.to_display_text()))
        }
        "upper" => {
            no_args(name, args)?;
            Ok(Value::String(input.to_display_text().to_uppercase()))
        }
        "lower" => {
            no_args(name, args)?;
            Ok(Value::String(input.to_display_text().to_lowercase()))
        }
        "title" => {
            no_args(name, args)?;
            Ok(Value::String(title_case(&input.to_display_text())))
        }
        "trim" => {
            no_args(name, args)?;
            Ok(Value::String(input.to_display_text().trim().to_string()))
        }
        "default" => {
            let [fallback] = bind_array(name, &["default_value"], args)?;
            let fallback = required(name, "default_value", fallback)?;
            Ok(if input.is_null() { fallback } else { input })
        }
        "length" => {
            no_args(name, args)?;
            let len = match &input {
                Value::String(text) => text.chars().count(),
                Value::Sequence(items) => items.len(),
                Value::Mapping(map) => map.len(),
                other => {
                    return Err(TemplateError::Type(
                        format!("{} has no length", other.type_name()).into(),
                    ))
                }
            };
            Ok(Value::Int(i64::try_from(len).unwrap_or(i64::MAX)))
        }
        _ => Err(TemplateError::UnknownFilter(SmolStr::new(name))),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn to_int(input: &Value) -> Value {
    match input {
        Value::Int(number) => Value::Int(*number),
        Value::Bool(flag) => Value::Int(i64::from(*flag)),
        Value::Float(number) if number.is_finite() => Value::Int(number.trunc() as i64),
        Value::String(text) => match auto_cast(text.trim()) {
            Value::Int(number) => Value::Int(number),
            Value::Float(number) if number.is_finite() => Value::Int(number.trunc() as i64),
            _ => Value::Int(0),
        },
        _ => Value::Int(0),
    }
}

fn to_float(input: &Value) -> Value {
    match input {
        Value::Bool(flag) => Value::Float(if *flag { 1.0 } else { 0.0 }),
        Value::String(text) => Value::Float(auto_cast(text.trim()).as_f64().unwrap_or(0.0)),
        other => Value::Float(other.as_f64().unwrap_or(0.0)),
    }
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word_start = true;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            word_start = false;
        } else {
            out.push(ch);
            word_start = true;
        }
    }
    out
}
