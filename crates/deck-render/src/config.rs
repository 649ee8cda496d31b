//! Deck configuration loading and the per-page element cache.

#![allow(missing_docs)]

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use smol_str::SmolStr;
use tracing::debug;

use crate::action::{ActionSpec, InteractionType, NavigationKind};
use crate::element::{
    ButtonElement, PageDefinition, PageElement, RenderFrame, RenderRequest, SystemButtonLayout,
};
use crate::error::ConfigError;
use crate::merge::{apply_presets, Presets};
use crate::state::StateSnapshot;
use crate::template::has_template;
use crate::value::{Mapping, Value};

pub const DEFAULT_BUTTONS_PER_PAGE: usize = 15;

const IS_DYNAMIC_KEY: &str = "is_dynamic";

/// Loaded deck configuration. Owns the lazily created page elements, so a
/// reload (a new `Configuration`) starts with fresh diff caches.
#[derive(Debug)]
pub struct Configuration {
    buttons_per_page: usize,
    presets: Presets,
    system_buttons: SystemButtonLayout,
    pages: IndexMap<SmolStr, PageDefinition>,
    elements: Mutex<FxHashMap<SmolStr, Arc<Mutex<PageElement>>>>,
}

#[derive(Debug, Deserialize)]
struct ConfigToml {
    #[serde(default = "default_buttons_per_page")]
    buttons_per_page: usize,
    #[serde(default)]
    presets: Mapping,
    #[serde(default)]
    system_buttons: IndexMap<SmolStr, SystemButtonSection>,
    #[serde(default)]
    pages: IndexMap<SmolStr, Mapping>,
}

#[derive(Debug, Deserialize)]
struct SystemButtonSection {
    position: Option<usize>,
    button: Option<Mapping>,
}

fn default_buttons_per_page() -> usize {
    DEFAULT_BUTTONS_PER_PAGE
}

impl Configuration {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: ConfigToml =
            toml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string().into()))?;
        raw.into_config()
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let raw: ConfigToml = serde_json::from_str(text)
            .map_err(|err| ConfigError::Parse(err.to_string().into()))?;
        raw.into_config()
    }

    /// Loads a `.json` or TOML document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string().into(),
            source,
        })?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_toml_str(&text)
        }
    }

    #[must_use]
    pub fn buttons_per_page(&self) -> usize {
        self.buttons_per_page
    }

    #[must_use]
    pub fn presets(&self) -> &Presets {
        &self.presets
    }

    #[must_use]
    pub fn system_buttons(&self) -> &SystemButtonLayout {
        &self.system_buttons
    }

    #[must_use]
    pub fn has_page(&self, page_id: &str) -> bool {
        self.pages.contains_key(page_id)
    }

    /// Page ids in document order.
    pub fn page_ids(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(SmolStr::as_str)
    }

    #[must_use]
    pub fn page_definition(&self, page_id: &str) -> Option<&PageDefinition> {
        self.pages.get(page_id)
    }

    /// Returns the cached element for `page_id`, creating it on first use.
    pub fn page_element(&self, page_id: &str) -> Result<Arc<Mutex<PageElement>>, ConfigError> {
        let definition = self
            .pages
            .get(page_id)
            .ok_or_else(|| ConfigError::UnknownPage(SmolStr::new(page_id)))?;
        let mut elements = self.elements.lock();
        let element = elements.entry(SmolStr::new(page_id)).or_insert_with(|| {
            debug!(page = page_id, "creating page element");
            Arc::new(Mutex::new(PageElement::new(page_id, definition.clone())))
        });
        Ok(Arc::clone(element))
    }

    /// Renders page `page_number` of `page_id` as a top-level page.
    pub fn render(
        &self,
        page_id: &str,
        snapshot: &StateSnapshot,
        page_number: usize,
    ) -> Result<RenderFrame, ConfigError> {
        self.render_with(
            page_id,
            snapshot,
            RenderRequest {
                page_number,
                is_sub_page: false,
            },
        )
    }

    /// Renders a page. Renders of the same page id are serialized on the
    /// page's lock.
    pub fn render_with(
        &self,
        page_id: &str,
        snapshot: &StateSnapshot,
        request: RenderRequest,
    ) -> Result<RenderFrame, ConfigError> {
        let element = self.page_element(page_id)?;
        let mut page = element.lock();
        Ok(page.render(snapshot, &self.system_buttons, request))
    }

    /// Button at a window index of the last render of `page_id`.
    #[must_use]
    pub fn button_at(&self, page_id: &str, index: usize) -> Option<ButtonElement> {
        let element = self.elements.lock().get(page_id).cloned()?;
        let page = element.lock();
        page.button_at(index).cloned()
    }

    /// Page ids whose definition or last rendered frame differ from `other`,
    /// including pages present in only one of the two.
    #[must_use]
    pub fn changed_pages(&self, other: &Configuration) -> Vec<SmolStr> {
        let mut ids: Vec<&SmolStr> = self.pages.keys().collect();
        ids.extend(other.pages.keys().filter(|id| !self.pages.contains_key(id.as_str())));

        ids.into_iter()
            .filter(|id| {
                let definition_changed = self.pages.get(id.as_str()) != other.pages.get(id.as_str());
                definition_changed || self.cached_frame(id) != other.cached_frame(id)
            })
            .cloned()
            .collect()
    }

    fn cached_frame(&self, page_id: &str) -> Option<crate::element::RawFrame> {
        let element = self.elements.lock().get(page_id).cloned()?;
        let page = element.lock();
        Some(page.raw_frame().clone()).filter(|frame| !frame.is_empty())
    }
}

impl ConfigToml {
    fn into_config(self) -> Result<Configuration, ConfigError> {
        if self.buttons_per_page == 0 {
            return Err(ConfigError::InvalidButtonsPerPage(self.buttons_per_page));
        }
        let presets = self.presets;

        let mut system_buttons = SystemButtonLayout::with_defaults(self.buttons_per_page);
        for (key, section) in self.system_buttons {
            let kind = NavigationKind::from_action_name(&key)
                .ok_or_else(|| ConfigError::UnknownSystemButton(key.clone()))?;
            let target = system_buttons.get_mut(kind);
            if let Some(button) = section.button {
                let mut button = prepare_button(button, &presets, &format!("system button '{key}'"))?;
                if !button.contains_key(InteractionType::Tap.spec_key()) {
                    button.insert(
                        InteractionType::Tap.spec_key().into(),
                        Value::from(kind.action_name()),
                    );
                }
                target.button = button;
            }
            if let Some(position) = section.position {
                target.position = position;
            }
        }

        let mut pages = IndexMap::with_capacity(self.pages.len());
        for (page_id, page) in self.pages {
            let definition = page_definition(&page_id, page, &presets, self.buttons_per_page)?;
            pages.insert(page_id, definition);
        }

        Ok(Configuration {
            buttons_per_page: self.buttons_per_page,
            presets,
            system_buttons,
            pages,
            elements: Mutex::new(FxHashMap::default()),
        })
    }
}

fn page_definition(
    page_id: &str,
    page: Mapping,
    presets: &Presets,
    buttons_per_page: usize,
) -> Result<PageDefinition, ConfigError> {
    let page = apply_presets(page, presets);
    let is_sub_page = match page.get("is_sub_page") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(other) => {
            return Err(ConfigError::InvalidDocument(
                format!("page '{page_id}': is_sub_page must be a bool, got {}", other.type_name())
                    .into(),
            ))
        }
    };
    let raw_buttons = match page.get("buttons") {
        None | Some(Value::Null) => &[][..],
        Some(Value::Sequence(items)) => items.as_slice(),
        Some(other) => {
            return Err(ConfigError::InvalidDocument(
                format!("page '{page_id}': buttons must be a list, got {}", other.type_name())
                    .into(),
            ))
        }
    };

    let mut buttons = Vec::with_capacity(raw_buttons.len());
    for (index, raw) in raw_buttons.iter().enumerate() {
        let location = format!("page '{page_id}' button {index}");
        let slot = match raw {
            Value::Null => None,
            Value::Mapping(spec) => Some(prepare_button(spec.clone(), presets, &location)?)
                .filter(|spec| !spec.is_empty()),
            other => {
                return Err(ConfigError::InvalidDocument(
                    format!("{location}: expected a mapping, got {}", other.type_name()).into(),
                ))
            }
        };
        buttons.push(slot);
    }

    Ok(PageDefinition {
        buttons,
        buttons_per_page,
        is_sub_page,
    })
}

/// Applies presets, flags templated buttons as dynamic and validates static
/// actions.
fn prepare_button(spec: Mapping, presets: &Presets, location: &str) -> Result<Mapping, ConfigError> {
    let mut spec = apply_presets(spec, presets);
    if !spec.contains_key(IS_DYNAMIC_KEY) && spec.values().any(has_template) {
        spec.insert(IS_DYNAMIC_KEY.into(), Value::Bool(true));
    }
    for interaction in InteractionType::ALL {
        let key = interaction.spec_key();
        let Some(raw) = spec.get(key).filter(|raw| !raw.is_null()) else {
            continue;
        };
        if has_template(raw) {
            continue;
        }
        ActionSpec::parse(raw).map_err(|source| ConfigError::InvalidAction {
            location: location.into(),
            interaction: key.into(),
            source,
        })?;
    }
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
buttons_per_page = 5

[presets.light]
icon = "mdi:lightbulb"
tap_action = { action = "light.toggle" }

[system_buttons."$page.next"]
position = 3
button = { icon = "mdi:arrow-right" }

[pages.main]
buttons = [
  { entity_id = "light.kitchen", presets = ["light"] },
  {},
  { name = "{{ states('sensor.temp') }}" },
  { name = "Fixed", is_dynamic = false },
]

[pages.lights]
is_sub_page = true
"#;

    #[test]
    fn loads_pages_and_applies_presets() {
        let config = Configuration::from_toml_str(DOC).unwrap();
        assert_eq!(config.buttons_per_page(), 5);
        assert_eq!(config.page_ids().collect::<Vec<_>>(), vec!["main", "lights"]);

        let main = config.page_definition("main").unwrap();
        let kitchen = main.buttons[0].as_ref().unwrap();
        assert_eq!(kitchen["icon"], Value::from("mdi:lightbulb"));
        assert!(!kitchen.contains_key("presets"));
        assert!(main.buttons[1].is_none());
        assert!(config.page_definition("lights").unwrap().is_sub_page);
    }

    #[test]
    fn templated_buttons_become_dynamic() {
        let config = Configuration::from_toml_str(DOC).unwrap();
        let main = config.page_definition("main").unwrap();
        assert_eq!(main.buttons[2].as_ref().unwrap()[IS_DYNAMIC_KEY], Value::Bool(true));
        assert_eq!(main.buttons[3].as_ref().unwrap()[IS_DYNAMIC_KEY], Value::Bool(false));
        assert!(!main.buttons[0].as_ref().unwrap().contains_key(IS_DYNAMIC_KEY));
    }

    #[test]
    fn system_buttons_get_navigation_actions() {
        let config = Configuration::from_toml_str(DOC).unwrap();
        let next = &config.system_buttons().next;
        assert_eq!(next.position, 3);
        assert_eq!(next.button["tap_action"], Value::from("$page.next"));
        assert_eq!(config.system_buttons().back.position, 1);
    }

    #[test]
    fn rejects_zero_buttons_per_page() {
        let err = Configuration::from_toml_str("buttons_per_page = 0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidButtonsPerPage(0)));
    }

    #[test]
    fn rejects_malformed_static_action() {
        let err = Configuration::from_toml_str(
            "[pages.main]\nbuttons = [{ tap_action = { action = \"toggle\" } }]",
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid tap_action on page 'main' button 0: malformed action 'toggle'"
        );
    }

    #[test]
    fn templated_action_is_checked_at_render_time() {
        let config = Configuration::from_toml_str(
            "[pages.main]\nbuttons = [{ tap_action = \"{{ 'light' }}\" }]",
        );
        assert!(config.is_ok());
    }

    #[test]
    fn rejects_unknown_system_button() {
        let err = Configuration::from_toml_str("[system_buttons.home]\nposition = 1").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownSystemButton(name) if name == "home"));
    }

    #[test]
    fn json_documents_load_too() {
        let config = Configuration::from_json_str(
            r#"{"pages": {"main": {"buttons": [null, {"name": "A"}]}}}"#,
        )
        .unwrap();
        assert_eq!(config.buttons_per_page(), DEFAULT_BUTTONS_PER_PAGE);
        assert_eq!(config.page_definition("main").unwrap().buttons.len(), 2);
    }

    #[test]
    fn page_elements_are_cached() {
        let config = Configuration::from_toml_str(DOC).unwrap();
        let first = config.page_element("main").unwrap();
        let second = config.page_element("main").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(matches!(
            config.page_element("nope"),
            Err(ConfigError::UnknownPage(_))
        ));
    }
}
