//! Resolved, displayable view of one button slot.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::warn;

use crate::action::{ActionSpec, InteractionType, NavigationContext, ServiceCaller};
use crate::icon::{IconDescriptor, IconProvider};
use crate::value::{Mapping, Value};

/// A button built fresh from a resolved spec on every render.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ButtonElement {
    pub name: Option<String>,
    pub icon: IconDescriptor,
    pub actions: IndexMap<InteractionType, ActionSpec>,
}

impl ButtonElement {
    /// Builds the element from a fully resolved spec.
    ///
    /// An action that does not parse is dropped so the rest of the button
    /// still renders.
    #[must_use]
    pub fn from_spec(spec: &Mapping) -> Self {
        let name = spec
            .get("name")
            .filter(|name| !name.is_null())
            .map(Value::to_display_text);
        let mut actions = IndexMap::new();
        for interaction in InteractionType::ALL {
            let Some(raw) = spec.get(interaction.spec_key()).filter(|raw| !raw.is_null()) else {
                continue;
            };
            match ActionSpec::parse(raw) {
                Ok(action) => {
                    actions.insert(interaction, action);
                }
                Err(err) => warn!(%interaction, error = %err, "dropping unparseable action"),
            }
        }
        Self {
            name,
            icon: IconDescriptor::from_spec(spec),
            actions,
        }
    }

    /// Name trimmed for display; `None` when missing or blank.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    #[must_use]
    pub fn action(&self, interaction: InteractionType) -> Option<&ActionSpec> {
        self.actions.get(&interaction)
    }

    /// Dispatches the action bound to `interaction`. Returns `false`, with no
    /// side effects, when nothing is bound.
    pub fn trigger_action(
        &self,
        interaction: InteractionType,
        navigation: &mut dyn NavigationContext,
        services: &mut dyn ServiceCaller,
    ) -> bool {
        let Some(action) = self.actions.get(&interaction) else {
            return false;
        };
        action.dispatch(navigation, services);
        true
    }

    pub fn render_icon<P: IconProvider>(&self, provider: &P) -> P::Image {
        provider.resolve_icon(&self.icon)
    }
}
