//! Item grammar and document building through the public API.

use macline::{build, classify, Error, RequestBuilder, RequestItem};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

#[test]
fn scenario_fields_raw_json_and_header() {
    let built = build(["name=widget", "meta.count:=5", "X-Trace:abc123"]).unwrap();

    assert_eq!(
        built.document.into_value(),
        json!({"name": "widget", "meta": {"count": 5}})
    );
    assert_eq!(built.headers.len(), 1);
    assert_eq!(built.headers["X-Trace"], "abc123");
}

#[test]
fn raw_json_separator_wins_wherever_it_appears() {
    for token in ["a:=1", "a:b=c:=1", "x=y:=1", "h:v:=1"] {
        let item = classify(token).unwrap();
        assert!(
            matches!(item, RequestItem::RawJson { .. }),
            "{token} should be raw JSON, got {item:?}"
        );
    }
}

#[test]
fn header_keeps_everything_after_first_colon() {
    match classify("a:b:c").unwrap() {
        RequestItem::Header { name, value } => {
            assert_eq!(name, "a");
            assert_eq!(value, "b:c");
        }
        other => panic!("expected header, got {other:?}"),
    }
}

#[test]
fn bad_raw_json_leaves_document_as_it_was() {
    let mut builder = RequestBuilder::new();
    builder.push("name=widget").unwrap();
    let before = builder.current().clone();

    let err = builder.push("x:={bad").unwrap_err();

    assert!(matches!(err, Error::InvalidJson { ref raw, .. } if raw == "{bad"));
    assert_eq!(builder.current(), &before);
    assert_eq!(builder.finish().document.into_value(), json!({"name": "widget"}));
}

#[test]
fn nested_paths_create_only_the_path() {
    let built = build(["a.b.c=leaf"]).unwrap();
    let value = built.document.into_value();

    assert_eq!(value.as_object().unwrap().len(), 1);
    assert_eq!(value["a"].as_object().unwrap().len(), 1);
    assert_eq!(value["a"]["b"].as_object().unwrap().len(), 1);
    assert_eq!(value["a"]["b"]["c"], "leaf");
}

#[test]
fn repeated_path_keeps_last_value() {
    let built = build(["user.name=first", "user.name:=[\"second\"]"]).unwrap();
    assert_eq!(
        built.document.into_value(),
        json!({"user": {"name": ["second"]}})
    );
}

#[test]
fn string_documents_round_trip() {
    let built = build(["title=Hello", "author.name=Ada", "author.role=admin", "n=5"]).unwrap();
    let text = built.document.to_json().unwrap();

    let parsed: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        parsed,
        json!({"title": "Hello", "author": {"name": "Ada", "role": "admin"}, "n": "5"})
    );
}

#[test]
fn writing_below_a_string_is_a_conflict() {
    let err = build(["user=ada", "user.name=ada"]).unwrap_err();
    assert!(matches!(err, Error::PathConflict { ref segment, .. } if segment == "user"));
}
