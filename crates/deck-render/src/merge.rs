//! Deep merge of configuration fragments and named preset resolution.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::debug;

use crate::value::{Mapping, Value};

/// Named reusable configuration fragments.
pub type Presets = Mapping;

/// Key that lists the presets a fragment inherits from.
pub const PRESETS_KEY: &str = "presets";

/// Merges `overlay` into `base`.
///
/// Keys missing from `base` are added. When both sides hold a mapping the
/// merge recurses (nested levels always ignore nulls). Otherwise the overlay
/// value wins, except that a `null` overlay only replaces the base value when
/// `allow_null` is set.
pub fn deep_merge(base: &mut Mapping, overlay: Mapping, allow_null: bool) {
    for (key, value) in overlay {
        match base.get_mut(&key) {
            None => {
                base.insert(key, value);
            }
            Some(slot) => match (slot, value) {
                (Value::Mapping(existing), Value::Mapping(nested)) => {
                    deep_merge(existing, nested, false);
                }
                (_, Value::Null) if !allow_null => {}
                (slot, value) => *slot = value,
            },
        }
    }
}

/// Normalizes a `presets` value to a list of names.
///
/// A single string becomes a one-element list; non-string list entries are
/// ignored.
#[must_use]
pub fn preset_names(value: &Value) -> Vec<SmolStr> {
    match value {
        Value::String(name) => vec![SmolStr::new(name)],
        Value::Sequence(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(SmolStr::new)
            .collect(),
        _ => Vec::new(),
    }
}

/// Expands the `presets` of `source` into a fully merged fragment.
///
/// Names are walked last-to-first and the first value seen for a key is
/// kept, so later names win on conflicts. The source itself always wins over
/// every preset. A preset may name further presets; each name is applied at
/// most once, which also ends cycles.
#[must_use]
pub fn apply_presets(source: Mapping, presets: &Presets) -> Mapping {
    let mut applied: FxHashSet<SmolStr> = FxHashSet::default();
    let mut output = source;

    loop {
        let names = output
            .shift_remove(PRESETS_KEY)
            .map(|value| preset_names(&value))
            .unwrap_or_default();
        if names.is_empty() {
            break;
        }

        let mut merged = Mapping::new();
        for name in names.iter().rev() {
            if !applied.insert(name.clone()) {
                continue;
            }
            let Some(preset) = presets.get(name.as_str()).and_then(Value::as_mapping) else {
                debug!(preset = %name, "preset not found");
                continue;
            };
            for (key, value) in preset {
                match (merged.get_mut(key), value) {
                    (None, _) => {
                        merged.insert(key.clone(), value.clone());
                    }
                    (Some(Value::Mapping(existing)), Value::Mapping(nested)) => {
                        deep_merge(existing, nested.clone(), false);
                    }
                    _ => {}
                }
            }
        }

        deep_merge(&mut merged, output, true);
        output = merged;
    }

    output
}
