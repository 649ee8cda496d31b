//! Icon descriptors handed to the external icon provider.

#![allow(missing_docs)]

use std::fmt;

use serde::Serialize;

use crate::value::{Mapping, Value};

/// Button spec keys that drive behaviour rather than icon styling.
pub const BEHAVIOUR_KEYS: [&str; 9] = [
    "entity_id",
    "icon",
    "name",
    "visibility",
    "is_dynamic",
    "states",
    "tap_action",
    "hold_action",
    "presets",
];

/// Where an icon image comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IconSource {
    Blank,
    Local,
    Url,
    Text,
    /// Material Design Icons.
    Mdi,
    /// Phosphor icons.
    Pi,
}

impl IconSource {
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Blank => "blank",
            Self::Local => "local",
            Self::Url => "url",
            Self::Text => "text",
            Self::Mdi => "mdi",
            Self::Pi => "pi",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        [
            Self::Blank,
            Self::Local,
            Self::Url,
            Self::Text,
            Self::Mdi,
            Self::Pi,
        ]
        .into_iter()
        .find(|source| source.prefix() == prefix)
    }
}

impl fmt::Display for IconSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Everything the icon provider needs to produce a button image.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct IconDescriptor {
    /// Icon reference such as `mdi:lightbulb`, `url:https://...` or
    /// `text:42`.
    pub icon: Option<String>,
    /// Non-behavioural spec keys (colors, offsets, sizes, ...).
    pub style: Mapping,
}

impl IconDescriptor {
    /// Builds the descriptor from a resolved button spec.
    #[must_use]
    pub fn from_spec(spec: &Mapping) -> Self {
        let icon = spec
            .get("icon")
            .filter(|icon| !icon.is_null())
            .map(Value::to_display_text);
        let style = spec
            .iter()
            .filter(|(key, _)| !BEHAVIOUR_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Self { icon, style }
    }

    /// Splits the icon reference into its source and the remainder.
    ///
    /// No icon, an empty reference or `blank` yields [`IconSource::Blank`].
    /// Bare `http(s)://` references are URLs; references without a known
    /// `<source>:` prefix are local file names.
    #[must_use]
    pub fn source(&self) -> (IconSource, &str) {
        let Some(icon) = self.icon.as_deref().map(str::trim) else {
            return (IconSource::Blank, "");
        };
        if icon.is_empty() || icon == IconSource::Blank.prefix() {
            return (IconSource::Blank, "");
        }
        if icon.starts_with("http://") || icon.starts_with("https://") {
            return (IconSource::Url, icon);
        }
        match icon.split_once(':') {
            Some((prefix, rest)) => match IconSource::from_prefix(prefix) {
                Some(source) => (source, rest),
                None => (IconSource::Local, icon),
            },
            None => (IconSource::Local, icon),
        }
    }
}

/// Resolves icon descriptors to images. Rasterization lives outside the
/// render pipeline.
pub trait IconProvider {
    type Image;

    fn resolve_icon(&self, descriptor: &IconDescriptor) -> Self::Image;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor(icon: &str) -> IconDescriptor {
        IconDescriptor {
            icon: Some(icon.to_string()),
            style: Mapping::new(),
        }
    }

    #[test]
    fn splits_known_prefixes() {
        assert_eq!(descriptor("mdi:lightbulb").source(), (IconSource::Mdi, "lightbulb"));
        assert_eq!(descriptor("pi:house").source(), (IconSource::Pi, "house"));
        assert_eq!(descriptor("text:21°").source(), (IconSource::Text, "21°"));
        assert_eq!(
            descriptor("url:https://x.test/a.png").source(),
            (IconSource::Url, "https://x.test/a.png")
        );
    }

    #[test]
    fn fallbacks() {
        assert_eq!(IconDescriptor::default().source(), (IconSource::Blank, ""));
        assert_eq!(descriptor("blank").source(), (IconSource::Blank, ""));
        assert_eq!(descriptor("https://x.test/a.png").source().0, IconSource::Url);
        assert_eq!(descriptor("lamp.png").source(), (IconSource::Local, "lamp.png"));
    }

    #[test]
    fn style_excludes_behaviour_keys() {
        let Value::Mapping(spec) = Value::from(json!({
            "name": "Lamp",
            "icon": "mdi:lamp",
            "tap_action": "light.toggle",
            "icon_color": "FFAA00",
        })) else {
            unreachable!()
        };
        let descriptor = IconDescriptor::from_spec(&spec);
        assert_eq!(descriptor.icon.as_deref(), Some("mdi:lamp"));
        assert_eq!(descriptor.style.len(), 1);
        assert_eq!(descriptor.style["icon_color"], Value::from("FFAA00"));
    }
}
