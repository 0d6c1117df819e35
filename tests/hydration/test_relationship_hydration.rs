// Tests for relationship hydration

use graphrest_core::{HydrateError, Hydrator};
use serde_json::json;

use crate::common::{full_node_payload, full_relationship_payload, node_uri, rel_uri};

#[test]
/// A full relationship document resolves type, endpoints, and properties.
fn test_full_relationship_hydrate() {
    let mut hydrator = Hydrator::new();
    let dehydrated = full_relationship_payload(11, "KNOWS", 23, 22, json!({ "since": 1999 }));

    let rel = hydrator
        .hydrate(&dehydrated)
        .unwrap()
        .into_relationship()
        .expect("payload should hydrate to a relationship");
    assert_eq!(rel.start_node().uri(), dehydrated["start"]);
    assert_eq!(rel.end_node().uri(), dehydrated["end"]);
    assert_eq!(rel.rel_type(), dehydrated["type"]);
    assert_eq!(
        serde_json::to_value(rel.properties()).unwrap(),
        dehydrated["data"]
    );
    assert_eq!(rel.uri(), rel_uri(11));
    assert_eq!(rel.remote().id, Some(11));
}

#[test]
/// Endpoints are the same instances as nodes hydrated independently, in either order.
fn test_endpoints_shared_with_cached_nodes() {
    let mut hydrator = Hydrator::new();
    let rel = hydrator
        .hydrate_relationship(&full_relationship_payload(11, "KNOWS", 23, 22, json!({})))
        .unwrap();
    let bob = hydrator
        .hydrate_node(&full_node_payload(22, Some(json!({ "name": "Bob" })), None))
        .unwrap();

    assert!(rel.end_node().same_entity(&bob));
    assert_eq!(rel.end_node().get("name"), Some(json!("Bob")));
    assert_eq!(hydrator.cache().node_count(), 2);
}

#[test]
/// Re-hydration replaces properties but keeps the recorded type and endpoints.
fn test_relationship_rehydration_replaces_properties() {
    let mut hydrator = Hydrator::new();
    let first = hydrator
        .hydrate_relationship(&full_relationship_payload(
            11,
            "KNOWS",
            23,
            22,
            json!({ "since": 1999, "weight": 2 }),
        ))
        .unwrap();
    let second = hydrator
        .hydrate_relationship(&full_relationship_payload(
            11,
            "KNOWS",
            23,
            22,
            json!({ "since": 2001 }),
        ))
        .unwrap();

    assert!(first.same_entity(&second));
    assert_eq!(first.get("since"), Some(json!(2001)));
    assert_eq!(first.get("weight"), None);
    assert_eq!(hydrator.cache().relationship_count(), 1);
}

#[test]
/// The first recorded type wins; a conflicting type is an error.
fn test_relationship_type_is_immutable() {
    let mut hydrator = Hydrator::new();
    hydrator
        .hydrate(&full_relationship_payload(11, "KNOWS", 23, 22, json!({})))
        .unwrap();
    let err = hydrator
        .hydrate(&full_relationship_payload(11, "LOVES", 23, 22, json!({})))
        .unwrap_err();
    assert!(matches!(err, HydrateError::TypeConflict { ref existing, ref incoming, .. }
        if existing == "KNOWS" && incoming == "LOVES"));
}

#[test]
/// A relationship by URI alone cannot be created from nothing.
fn test_relationship_reference_without_detail() {
    let mut hydrator = Hydrator::new();
    let err = hydrator.hydrate(&json!({ "self": rel_uri(11) })).unwrap_err();
    assert!(matches!(err, HydrateError::MissingAttribute { .. }));
    assert!(!hydrator.cache().contains_relationship(&rel_uri(11)));
    assert!(!hydrator.cache().contains_node(&node_uri(23)));
}

#[test]
/// Display uses the compact pattern notation.
fn test_relationship_display() {
    let mut hydrator = Hydrator::new();
    let rel = hydrator
        .hydrate_relationship(&full_relationship_payload(11, "KNOWS", 23, 22, json!({})))
        .unwrap();
    assert_eq!(rel.to_string(), "(_23)-[_11:KNOWS]->(_22)");
}
