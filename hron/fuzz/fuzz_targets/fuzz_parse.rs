#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Err(err) = hron::parser::parse(s) {
            // Rendering must stay inside the input, whatever the span.
            let _ = err.display_rich();
        }
    }
});
