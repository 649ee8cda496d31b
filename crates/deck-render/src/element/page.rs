//! Page rendering: entity binding, templates, visibility, pagination,
//! windowing and diffing against the previous frame.

use std::collections::BTreeMap;

use serde::Serialize;
use smol_str::SmolStr;
use tracing::{debug, warn};

use crate::action::NavigationKind;
use crate::merge::deep_merge;
use crate::state::{EntityState, StateSnapshot};
use crate::template::render_mapping;
use crate::value::{Mapping, Value};

use super::button::ButtonElement;

/// Raw fragments keyed by slot index. `None` is an empty slot.
pub type RawFrame = BTreeMap<usize, Option<Mapping>>;

/// Smallest page size that leaves room for content next to the back,
/// previous and next buttons.
pub const MIN_PAGINATED_BUTTONS: usize = 3;

/// Static definition of a page, with presets already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct PageDefinition {
    /// Authored slots in order; `None` is a deliberate gap.
    pub buttons: Vec<Option<Mapping>>,
    pub buttons_per_page: usize,
    pub is_sub_page: bool,
}

/// A synthetic navigation button and where it goes within a chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemButton {
    pub button: Mapping,
    /// 1-based position inside each chunk. `0` disables back/previous and
    /// puts next in the last slot.
    pub position: usize,
}

/// Back, previous and next buttons used by pagination.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemButtonLayout {
    pub back: SystemButton,
    pub previous: SystemButton,
    pub next: SystemButton,
}

impl SystemButtonLayout {
    /// Default layout: back and previous in the first slot, next in the last.
    #[must_use]
    pub fn with_defaults(buttons_per_page: usize) -> Self {
        let button = |kind: NavigationKind, icon: &str| {
            let mut spec = Mapping::new();
            spec.insert("icon".into(), Value::from(icon));
            spec.insert("tap_action".into(), Value::from(kind.action_name()));
            spec
        };
        Self {
            back: SystemButton {
                button: button(NavigationKind::Back, "mdi:arrow-left"),
                position: 1,
            },
            previous: SystemButton {
                button: button(NavigationKind::Previous, "mdi:chevron-left"),
                position: 1,
            },
            next: SystemButton {
                button: button(NavigationKind::Next, "mdi:chevron-right"),
                position: buttons_per_page,
            },
        }
    }

    #[must_use]
    pub fn get(&self, kind: NavigationKind) -> &SystemButton {
        match kind {
            NavigationKind::Back => &self.back,
            NavigationKind::Previous => &self.previous,
            NavigationKind::Next => &self.next,
        }
    }

    pub fn get_mut(&mut self, kind: NavigationKind) -> &mut SystemButton {
        match kind {
            NavigationKind::Back => &mut self.back,
            NavigationKind::Previous => &mut self.previous,
            NavigationKind::Next => &mut self.next,
        }
    }
}

/// Which page of a paginated page to render, and how it was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderRequest {
    /// 1-based; `0` is treated as `1`.
    pub page_number: usize,
    /// Reached from another page, so the first chunk gets a back button.
    pub is_sub_page: bool,
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self {
            page_number: 1,
            is_sub_page: false,
        }
    }
}

/// Result of one render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFrame {
    pub page_number: usize,
    pub page_count: usize,
    /// Exactly `buttons_per_page` slots.
    pub buttons: Vec<Option<ButtonElement>>,
    /// Slots whose content differs from the previous render.
    pub changed: BTreeMap<usize, Option<ButtonElement>>,
}

impl RenderFrame {
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.changed.is_empty()
    }
}

/// Tri-state visibility of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    /// Slot stays, but empty.
    Hidden,
    /// Slot is dropped and later slots shift down.
    Gone,
}

impl Visibility {
    #[must_use]
    pub fn of(spec: &Mapping) -> Self {
        match spec.get("visibility") {
            None => Self::Visible,
            Some(Value::Null) => Self::Gone,
            Some(Value::Bool(false)) => Self::Hidden,
            Some(Value::String(text)) => match text.as_str() {
                "false" | "False" | "hidden" => Self::Hidden,
                "none" | "None" | "gone" => Self::Gone,
                _ => Self::Visible,
            },
            Some(_) => Self::Visible,
        }
    }
}

/// One page: its definition plus the frame cached for diffing.
#[derive(Debug, Clone)]
pub struct PageElement {
    id: SmolStr,
    definition: PageDefinition,
    raw_frame: RawFrame,
    buttons: Vec<Option<ButtonElement>>,
}

impl PartialEq for PageElement {
    fn eq(&self, other: &Self) -> bool {
        self.definition == other.definition && self.raw_frame == other.raw_frame
    }
}

impl PageElement {
    #[must_use]
    pub fn new(id: impl Into<SmolStr>, definition: PageDefinition) -> Self {
        Self {
            id: id.into(),
            definition,
            raw_frame: RawFrame::new(),
            buttons: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn definition(&self) -> &PageDefinition {
        &self.definition
    }

    /// Fragments of the last delivered window, keyed by window index.
    #[must_use]
    pub fn raw_frame(&self) -> &RawFrame {
        &self.raw_frame
    }

    /// Button shown at a window index after the last render.
    #[must_use]
    pub fn button_at(&self, index: usize) -> Option<&ButtonElement> {
        self.buttons.get(index).and_then(Option::as_ref)
    }

    /// Buttons of the last rendered window.
    #[must_use]
    pub fn buttons(&self) -> &[Option<ButtonElement>] {
        &self.buttons
    }

    /// Renders one window of the page and diffs it slot by slot against the
    /// window delivered by the previous render, whichever page number that
    /// was.
    pub fn render(
        &mut self,
        snapshot: &StateSnapshot,
        layout: &SystemButtonLayout,
        request: RenderRequest,
    ) -> RenderFrame {
        let per_page = self.definition.buttons_per_page.max(1);
        let page_number = request.page_number.max(1);
        let is_sub_page = request.is_sub_page || self.definition.is_sub_page;

        let mut slots = resolve_slots(&self.definition.buttons, snapshot);
        let page_count = paginate(&mut slots, layout, per_page, is_sub_page);

        // Out-of-range page numbers render an empty window.
        let start = (page_number - 1).checked_mul(per_page);
        let mut window = RawFrame::new();
        let mut buttons = Vec::with_capacity(per_page);
        let mut changed = BTreeMap::new();
        for index in 0..per_page {
            let fresh = start
                .and_then(|start| start.checked_add(index))
                .and_then(|absolute| slot_at(&slots, absolute));
            let button = fresh.map(ButtonElement::from_spec);
            if fresh != slot_at(&self.raw_frame, index) {
                changed.insert(index, button.clone());
            }
            window.insert(index, fresh.cloned());
            buttons.push(button);
        }

        debug!(
            page = %self.id,
            page_number,
            page_count,
            changed = changed.len(),
            "rendered page"
        );
        self.raw_frame = window;
        self.buttons.clone_from(&buttons);
        RenderFrame {
            page_number,
            page_count,
            buttons,
            changed,
        }
    }
}

fn slot_at(frame: &RawFrame, index: usize) -> Option<&Mapping> {
    frame.get(&index).and_then(Option::as_ref)
}

/// Binds state, evaluates templates and applies visibility, compacting
/// `gone` slots.
fn resolve_slots(buttons: &[Option<Mapping>], snapshot: &StateSnapshot) -> RawFrame {
    let mut slots = RawFrame::new();
    let mut skipped = 0;
    for (index, slot) in buttons.iter().enumerate() {
        let Some(spec) = slot.as_ref().filter(|spec| !spec.is_empty()) else {
            slots.insert(index - skipped, None);
            continue;
        };
        let mut spec = spec.clone();
        let entity_id = spec
            .get("entity_id")
            .and_then(Value::as_str)
            .map(SmolStr::new);
        if let Some(entity) = entity_id.as_deref().and_then(|id| snapshot.get(id)) {
            bind_entity(&mut spec, entity);
        }
        if spec.get("is_dynamic").is_some_and(Value::is_truthy) {
            spec = render_mapping(&spec, snapshot, entity_id.as_deref());
        }
        match Visibility::of(&spec) {
            Visibility::Visible => {
                slots.insert(index - skipped, Some(spec));
            }
            Visibility::Hidden => {
                slots.insert(index - skipped, None);
            }
            Visibility::Gone => skipped += 1,
        }
    }
    slots
}

/// Entity icon and friendly name as fallbacks, then the override for the
/// current state.
fn bind_entity(spec: &mut Mapping, entity: &EntityState) {
    if !spec.contains_key("icon") {
        if let Some(icon) = entity.attribute("icon").filter(|icon| icon.is_truthy()) {
            spec.insert("icon".into(), icon.clone());
        }
    }
    let state_override = spec
        .get("states")
        .and_then(Value::as_mapping)
        .and_then(|states| states.get(entity.state.as_str()))
        .and_then(Value::as_mapping)
        .cloned();
    if let Some(fragment) = state_override {
        deep_merge(spec, fragment, false);
    }
    if !spec.contains_key("name") {
        if let Some(name) = entity.attribute("friendly_name") {
            spec.insert("name".into(), name.clone());
        }
    }
}

/// Inserts system buttons chunk by chunk and returns the page count.
fn paginate(
    slots: &mut RawFrame,
    layout: &SystemButtonLayout,
    per_page: usize,
    is_sub_page: bool,
) -> usize {
    if per_page < MIN_PAGINATED_BUTTONS {
        warn!(per_page, "page too small for navigation buttons; skipping pagination");
        return last_key(slots).map_or(1, |last| last / per_page + 1);
    }

    let mut chunk_start = 0;
    let mut page = 1;
    while last_key(slots).is_some_and(|last| last >= chunk_start) {
        if is_sub_page && page == 1 && layout.back.position > 0 {
            insert_at(slots, chunk_start, per_page, &layout.back);
        }
        if page > 1 && layout.previous.position > 0 {
            insert_at(slots, chunk_start, per_page, &layout.previous);
        }
        if last_key(slots).is_some_and(|last| last >= chunk_start + per_page) {
            insert_at(slots, chunk_start, per_page, &layout.next);
        }
        chunk_start += per_page;
        page += 1;
    }
    (page - 1).max(1)
}

fn last_key(slots: &RawFrame) -> Option<usize> {
    slots.keys().next_back().copied()
}

/// Inserts at the button's position within the chunk, shifting every slot
/// at or after it up by one.
fn insert_at(slots: &mut RawFrame, chunk_start: usize, per_page: usize, system: &SystemButton) {
    let position = match system.position {
        0 => per_page,
        position => position.min(per_page),
    };
    let index = chunk_start + position - 1;
    let tail = slots.split_off(&index);
    slots.extend(tail.into_iter().map(|(key, slot)| (key + 1, slot)));
    slots.insert(index, Some(system.button.clone()));
}
