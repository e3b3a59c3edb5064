use drift_core::{ErrorKind, NodeId, Point};
use drift_remote::ResponseShape;
use serde_json::json;
use std::collections::BTreeMap;

fn positions(value: serde_json::Value) -> drift_core::Result<BTreeMap<NodeId, Point>> {
    ResponseShape::detect(value, "positions")?.into_positions()
}

#[test]
fn all_three_shapes_yield_the_same_positions() {
    let wrapped = positions(json!({ "positions": { "n1": { "x": 1, "y": 2 } } })).unwrap();
    let records = positions(json!([{ "id": "n1", "x": 1, "y": 2 }])).unwrap();
    let keyed = positions(json!({ "n1": { "x": 1, "y": 2 } })).unwrap();

    let expected = BTreeMap::from([(NodeId::from("n1"), Point::new(1.0, 2.0))]);
    assert_eq!(wrapped, expected);
    assert_eq!(records, expected);
    assert_eq!(keyed, expected);
}

#[test]
fn detection_order_prefers_the_wrapper_key() {
    let shape = ResponseShape::detect(
        json!({ "positions": { "a": { "x": 0, "y": 0 } }, "b": { "x": 5, "y": 5 } }),
        "positions",
    )
    .unwrap();
    assert_eq!(shape.name(), "wrapped");
    let out = shape.into_positions().unwrap();
    assert_eq!(out.len(), 1);
    assert!(out.contains_key("a"));
}

#[test]
fn custom_wrapper_key_is_honoured() {
    let out = ResponseShape::detect(json!({ "result": { "a": { "x": 3, "y": 4 } } }), "result")
        .unwrap()
        .into_positions()
        .unwrap();
    assert_eq!(out.get("a"), Some(&Point::new(3.0, 4.0)));

    // Without the key configured, the same body is read as keyed and `result` is not a position.
    let err = positions(json!({ "result": 7 })).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResponseShape);
}

#[test]
fn records_without_usable_coordinates_are_filtered() {
    let out = positions(json!([
        { "id": "a", "x": 1, "y": 1 },
        { "id": 7, "x": 2, "y": 2 },
        { "id": "no-y", "x": 3 },
        { "id": "text", "x": "1", "y": 1 },
        { "x": 4, "y": 4 },
        { "id": 1.5, "x": 5, "y": 5 },
        "junk",
    ]))
    .unwrap();
    assert_eq!(out.len(), 2);
    assert_eq!(out.get("7"), Some(&Point::new(2.0, 2.0)));
}

#[test]
fn keyed_entries_without_coordinates_are_skipped() {
    let out = positions(json!({ "a": { "x": 1, "y": 1 }, "b": { "x": 1 } })).unwrap();
    assert_eq!(out.len(), 1);
}

#[test]
fn wrapped_value_must_be_keyed_data() {
    for body in [
        json!({ "positions": [{ "id": "a", "x": 1, "y": 1 }] }),
        json!({ "positions": null }),
        json!({ "positions": "a" }),
    ] {
        let err = positions(body.clone()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResponseShape, "{body}");
    }
}

#[test]
fn scalar_responses_are_rejected() {
    for body in [json!(null), json!(true), json!(3), json!("positions")] {
        let err = ResponseShape::detect(body.clone(), "positions").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResponseShape, "{body}");
    }
}

#[test]
fn non_object_keyed_entry_rejects_the_whole_response() {
    let err = positions(json!({ "a": { "x": 1, "y": 1 }, "b": [1, 2] })).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResponseShape);
    assert!(err.to_string().contains("`b`"));
}
