#![no_main]

use deck_render::template::render_template;
use deck_render::{EntityState, StateSnapshot, Value};
use libfuzzer_sys::fuzz_target;

const MAX_SOURCE_BYTES: usize = 4096;

fuzz_target!(|data: &[u8]| {
    let capped = &data[..data.len().min(MAX_SOURCE_BYTES)];
    let source = String::from_utf8_lossy(capped).into_owned();
    let snapshot = StateSnapshot::new()
        .with_entity("sensor.temp", EntityState::new("21.5"))
        .with_entity("light.kitchen", EntityState::new("on"));
    // Failures are contained, never propagated.
    let _ = render_template(&Value::String(source), &snapshot, Some("light.kitchen"));
});
