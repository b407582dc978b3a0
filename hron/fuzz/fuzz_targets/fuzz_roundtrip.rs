#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(parsed) = hron::parser::parse(s) else {
        return;
    };
    let rendered = parsed.to_string();
    let reparsed = hron::parser::parse(&rendered).expect("canonical form must parse");
    assert_eq!(reparsed, parsed, "canonical form changed the schedule");
    assert_eq!(reparsed.to_string(), rendered);
});
