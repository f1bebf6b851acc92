#![no_main]
use libfuzzer_sys::fuzz_target;
use loose_uri::pct_enc;

fuzz_target!(|data: &str| {
    let encoded = pct_enc::encode(data);
    assert!(encoded.is_ascii());
    assert_eq!(pct_enc::decode(&encoded).unwrap(), data);

    let _ = pct_enc::decode(data);
});
