#![no_main]

use aeolus_di::Properties;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let props = Properties::parse(text);

    // Rendering escapes separators, comment markers, backslashes and leading
    // value whitespace, so every entry must survive a reparse.
    let reparsed = Properties::parse(&props.to_text());
    assert_eq!(reparsed, props);
});
