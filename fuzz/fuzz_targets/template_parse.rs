#![no_main]

use libfuzzer_sys::fuzz_target;

const MAX_SOURCE_BYTES: usize = 4096;

fuzz_target!(|data: &[u8]| {
    let capped = &data[..data.len().min(MAX_SOURCE_BYTES)];
    let source = String::from_utf8_lossy(capped);
    if let Err(err) = deck_syntax::parse_template(&source) {
        assert!(err.offset as usize <= source.len());
    }
    let _ = deck_syntax::parse_expression(&source);
});
