//! Shared fixtures for page rendering tests.
#![allow(dead_code)]

use std::fmt::Write;

pub use deck_render::{
    ButtonElement, Configuration, EntityState, InteractionType, NavigationContext, PageStack,
    RenderFrame, RenderRequest, ServiceCaller, StateSnapshot, Value,
};

/// Loads a TOML configuration, panicking on errors.
pub fn config(text: &str) -> Configuration {
    match Configuration::from_toml_str(text) {
        Ok(config) => config,
        Err(err) => panic!("fixture configuration failed to load: {err}"),
    }
}

/// Snapshot with a kitchen light, a temperature sensor and an unavailable
/// door sensor.
pub fn home_snapshot(light: &str) -> StateSnapshot {
    StateSnapshot::new()
        .with_entity(
            "light.kitchen",
            EntityState::new(light).with_attribute("friendly_name", "Kitchen"),
        )
        .with_entity(
            "sensor.temp",
            EntityState::new("21.5").with_attribute("unit_of_measurement", "°C"),
        )
        .with_entity("binary_sensor.flag", EntityState::new("true"))
        .with_entity("binary_sensor.door", EntityState::new("unavailable"))
}

/// Name, else icon reference, else `?`; `-` for an empty slot.
pub fn label(button: Option<&ButtonElement>) -> String {
    match button {
        None => "-".to_string(),
        Some(button) => button
            .display_name()
            .or(button.icon.icon.as_deref())
            .unwrap_or("?")
            .to_string(),
    }
}

/// Labels of every slot in the frame.
pub fn labels(frame: &RenderFrame) -> Vec<String> {
    frame.buttons.iter().map(|slot| label(slot.as_ref())).collect()
}

/// Indexes reported as changed.
pub fn changed(frame: &RenderFrame) -> Vec<usize> {
    frame.changed.keys().copied().collect()
}

/// One line per slot, `*` marking changed slots.
pub fn summarize(frame: &RenderFrame) -> String {
    let mut out = format!("page {}/{}", frame.page_number, frame.page_count);
    for (index, slot) in frame.buttons.iter().enumerate() {
        let marker = if frame.changed.contains_key(&index) { "*" } else { " " };
        let _ = write!(out, "\n{index}{marker} {}", label(slot.as_ref()));
    }
    out
}

/// Records service calls; navigation goes to the wrapped page stack.
#[derive(Debug, Default)]
pub struct ServiceLog {
    pub calls: Vec<String>,
}

impl ServiceCaller for ServiceLog {
    fn call_service(&mut self, domain: &str, service: &str, _data: &Value) {
        self.calls.push(format!("{domain}.{service}"));
    }
}

/// Presses the button at `index` of `frame`.
pub fn press(frame: &RenderFrame, index: usize, stack: &mut PageStack, services: &mut ServiceLog) -> bool {
    let Some(button) = frame.buttons[index].as_ref() else {
        return false;
    };
    button.trigger_action(InteractionType::Tap, stack, services)
}

/// Renders the stack's current page and records its page count.
pub fn render_current(config: &Configuration, snapshot: &StateSnapshot, stack: &mut PageStack) -> RenderFrame {
    let page_id = stack.current().page_id.clone();
    let frame = config
        .render_with(&page_id, snapshot, stack.request())
        .unwrap_or_else(|err| panic!("render of '{page_id}' failed: {err}"));
    stack.set_page_count(frame.page_count);
    frame
}
