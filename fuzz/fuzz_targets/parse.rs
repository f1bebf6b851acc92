#![no_main]
use libfuzzer_sys::fuzz_target;
use loose_uri::{Parts, Uri};

fuzz_target!(|data: &str| {
    let Ok(parts) = Parts::extract(data) else {
        assert!(!data.is_empty());
        return;
    };

    let mut len = 0;
    for (part, delim) in [
        (parts.protocol(), 3),
        (parts.username(), 1),
        (parts.password(), 1),
        (parts.host(), 0),
        (parts.port(), 1),
        (parts.path(), 0),
        (parts.query(), 1),
        (parts.fragment(), 1),
    ] {
        if let Some(s) = part {
            assert!(data.contains(s));
            len += s.len() + delim;
        }
    }
    assert!(len <= data.len());

    let s = Uri::from(parts).to_string();
    let reparsed = Uri::parse(&s).unwrap();
    assert_eq!(reparsed.to_string(), s);
});
