#![no_main]

use libfuzzer_sys::fuzz_target;
use sigil_abi::{human::parse_item, Item};

fuzz_target!(|input: &str| {
    let Ok(item) = parse_item(input) else {
        return;
    };
    let rendered = item.to_string();
    let reparsed: Item = rendered.parse().expect("rendered item must parse");
    assert_eq!(item, reparsed);
});
