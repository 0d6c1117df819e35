// Tests for node hydration and identity sharing

use graphrest_core::{Hydrated, Hydrator};
use serde_json::json;

use crate::common::{full_node_payload, node_uri};

#[test]
/// A payload carrying only `self` yields a bound node with no properties.
fn test_minimal_node_hydrate() {
    let mut hydrator = Hydrator::new();
    let dehydrated = json!({ "self": node_uri(0) });

    let hydrated = hydrator.hydrate(&dehydrated).unwrap();
    let node = hydrated.as_node().expect("payload should hydrate to a node");
    assert_eq!(node.uri(), dehydrated["self"]);
    assert_eq!(node.remote().id, Some(0));
    assert!(node.is_empty());
    assert!(node.labels().is_empty());
}

#[test]
/// `data` becomes the node's property mapping.
fn test_node_hydrate_with_properties() {
    let mut hydrator = Hydrator::new();
    let data = json!({ "name": "Alice", "age": 33 });
    let dehydrated = json!({ "self": node_uri(0), "data": data });

    let node = hydrator.hydrate_node(&dehydrated).unwrap();
    assert_eq!(serde_json::to_value(node.properties()).unwrap(), data);
    assert_eq!(node.uri(), node_uri(0));
}

#[test]
/// Link fields in a full server document are ignored; missing metadata means no labels.
fn test_full_node_hydrate_without_labels() {
    let mut hydrator = Hydrator::new();
    let data = json!({ "name": "Alice", "age": 33 });
    let dehydrated = full_node_payload(0, Some(data.clone()), None);

    let node = hydrator.hydrate_node(&dehydrated).unwrap();
    assert_eq!(serde_json::to_value(node.properties()).unwrap(), data);
    assert!(node.labels().is_empty());
    assert_eq!(node.uri(), node_uri(0));
}

#[test]
/// `metadata.labels` becomes the node's label set.
fn test_full_node_hydrate_with_labels() {
    let mut hydrator = Hydrator::new();
    let data = json!({ "name": "Alice", "age": 33 });
    let dehydrated = full_node_payload(0, Some(data.clone()), Some(&["Person", "Employee"]));

    let node = hydrator.hydrate_node(&dehydrated).unwrap();
    assert_eq!(serde_json::to_value(node.properties()).unwrap(), data);
    let labels: Vec<String> = node.labels().into_iter().collect();
    assert_eq!(labels, vec!["Employee", "Person"]);
    assert_eq!(node.uri(), node_uri(0));
}

#[test]
/// Hydrating the same URI twice returns the same instance, updated in place.
fn test_rehydration_shares_identity() {
    let mut hydrator = Hydrator::new();
    let first = hydrator
        .hydrate_node(&full_node_payload(
            0,
            Some(json!({ "name": "Alice" })),
            Some(&["Person"]),
        ))
        .unwrap();
    let second = hydrator
        .hydrate_node(&full_node_payload(
            0,
            Some(json!({ "name": "Alice", "age": 34 })),
            Some(&["Employee"]),
        ))
        .unwrap();

    assert!(first.same_entity(&second));
    assert_eq!(first.get("age"), Some(json!(34)));
    assert!(!first.has_label("Person"));
    assert!(first.has_label("Employee"));
    assert_eq!(hydrator.cache().node_count(), 1);
}

#[test]
/// Re-hydrating an up-to-date payload changes nothing observable.
fn test_idempotent_rehydration() {
    let mut hydrator = Hydrator::new();
    let payload = full_node_payload(5, Some(json!({ "name": "Eve" })), Some(&["Person"]));

    let first = hydrator.hydrate_node(&payload).unwrap();
    let (props, labels) = (first.properties(), first.labels());
    let second = hydrator.hydrate_node(&payload).unwrap();

    assert!(first.same_entity(&second));
    assert_eq!(second.properties(), props);
    assert_eq!(second.labels(), labels);
}

#[test]
/// A payload with no `self` and no entity shape is not a node.
fn test_missing_self_is_not_a_node() {
    let mut hydrator = Hydrator::new();
    let hydrated = hydrator.hydrate(&json!({ "data": { "name": "Alice" } })).unwrap();
    assert!(matches!(hydrated, Hydrated::Map(_)));
    assert!(hydrator.hydrate_node(&json!({ "data": {} })).is_err());
}

#[test]
/// A trailing slash on `self` names the same resource and the same instance.
fn test_trailing_slash_shares_identity() {
    let mut hydrator = Hydrator::new();
    let plain = hydrator.hydrate_node(&json!({ "self": node_uri(1) })).unwrap();
    let slashed = hydrator
        .hydrate_node(&json!({ "self": format!("{}/", node_uri(1)) }))
        .unwrap();

    assert!(plain.same_entity(&slashed));
    assert_eq!(slashed.remote().id, Some(1));
    assert_eq!(hydrator.cache().node_count(), 1);
}
