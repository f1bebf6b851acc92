#![cfg(feature = "serde")]

use loose_uri::{Parts, QueryValue, Uri};

#[test]
fn uri_as_string() {
    let uri = Uri::parse("https://example.com/a?tags[]=x&tags[]=y#top").unwrap();
    let json = serde_json::to_string(&uri).unwrap();
    assert_eq!(json, "\"https://example.com/a?tags[]=x&tags[]=y#top\"");

    let back: Uri = serde_json::from_str(&json).unwrap();
    assert_eq!(back, uri);

    let err = serde_json::from_str::<Uri>("\":bad\"").unwrap_err();
    assert!(err.to_string().contains("failed to parse"), "{err}");
}

#[test]
fn query_value_shapes() {
    let values = [
        QueryValue::from("a"),
        QueryValue::array(["b", "c"]),
        QueryValue::nested([("k", "v")]),
    ];
    let json = serde_json::to_string(&values).unwrap();
    assert_eq!(json, r#"["a",["b","c"],{"k":"v"}]"#);

    let back: Vec<QueryValue> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, values);
}

#[test]
fn parts_as_struct() {
    let parts = Parts::extract("http://h:1/p").unwrap();
    let json = serde_json::to_value(parts).unwrap();
    assert_eq!(json["host"], "h");
    assert_eq!(json["port"], "1");
    assert!(json["query"].is_null());
}
