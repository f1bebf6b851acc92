#![no_main]
use libfuzzer_sys::fuzz_target;
use loose_uri::query;

fuzz_target!(|data: &str| {
    let encoded = query::encode(&query::decode(data));
    assert!(!encoded.contains('#'));
    assert_eq!(query::encode(&query::decode(&encoded)), encoded);
});
