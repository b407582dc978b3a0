#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(converted) = hron::cron::from_cron(s) else {
        return;
    };
    let rendered = converted.to_string();
    let reparsed = hron::parser::parse(&rendered).expect("converted cron must render as hron");
    assert_eq!(reparsed, converted);
    if let Ok(cron) = hron::cron::to_cron(&converted) {
        let again = hron::cron::from_cron(&cron).expect("to_cron output must convert back");
        assert_eq!(hron::cron::to_cron(&again).ok(), Some(cron));
    }
});
