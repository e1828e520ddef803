#![allow(clippy::float_cmp)]

use super::*;
use crate::connector::{Anchor, Endpoint};
use crate::element::{ShapeKind, Size};

fn text_at(id: &str, x: f64, y: f64) -> Element {
    Element::new_text(id, Position::new(x, y))
}

fn shape(id: &str) -> Element {
    Element::new_shape(id, ShapeKind::Rectangle, Position::new(300.0, 200.0))
}

fn link(id: &str, from: &str, to: &str) -> Connector {
    Connector::new(id, Endpoint::new(from, Anchor::Right), Endpoint::new(to, Anchor::Left))
}

// =============================================================
// add / get / remove
// =============================================================

#[test]
fn new_store_is_empty() {
    let store = ElementStore::new();
    assert!(store.is_empty());
    assert_eq!(store.len(), 0);
    assert!(store.elements().is_empty());
    assert!(store.connectors().is_empty());
}

#[test]
fn add_and_get() {
    let mut store = ElementStore::new();
    store.add_element(text_at("text-1", 0.0, 0.0));
    assert_eq!(store.len(), 1);
    assert_eq!(store.get("text-1").unwrap().id(), "text-1");
    assert!(store.get("text-2").is_none());
}

#[test]
fn add_preserves_insertion_order() {
    let mut store = ElementStore::new();
    store.add_element(text_at("a", 0.0, 0.0));
    store.add_element(shape("b"));
    store.add_element(text_at("c", 0.0, 0.0));
    let ids: Vec<&str> = store.elements().iter().map(Element::id).collect();
    assert_eq!(ids, ["a", "b", "c"]);
}

#[test]
fn redelivered_add_replaces_in_place() {
    let mut store = ElementStore::new();
    store.add_element(text_at("a", 0.0, 0.0));
    store.add_element(shape("b"));
    store.add_element(text_at("a", 99.0, 99.0));

    assert_eq!(store.len(), 2);
    assert_eq!(store.get("a").unwrap().position(), Position::new(99.0, 99.0));
    // Order unchanged: "a" still first.
    assert_eq!(store.elements()[0].id(), "a");
}

#[test]
fn remove_returns_element() {
    let mut store = ElementStore::new();
    store.add_element(text_at("a", 1.0, 2.0));
    let removed = store.remove_element("a").unwrap();
    assert_eq!(removed.id(), "a");
    assert!(store.is_empty());
}

#[test]
fn remove_absent_is_noop() {
    let mut store = ElementStore::new();
    store.add_element(text_at("a", 0.0, 0.0));
    assert!(store.remove_element("ghost").is_none());
    assert_eq!(store.len(), 1);
}

// =============================================================
// update_element / last-write-wins
// =============================================================

#[test]
fn update_merges_patch() {
    let mut store = ElementStore::new();
    store.add_element(text_at("text-1", 0.0, 0.0));
    let applied = store.update_element(
        "text-1",
        &ElementPatch { position: Some(Position::new(40.0, 50.0)), bold: Some(true), ..Default::default() },
    );
    assert!(applied);
    let element = store.get("text-1").unwrap();
    assert_eq!(element.position(), Position::new(40.0, 50.0));
}

#[test]
fn update_absent_id_drops_silently() {
    let mut store = ElementStore::new();
    let applied = store.update_element("deleted-long-ago", &ElementPatch { bold: Some(true), ..Default::default() });
    assert!(!applied);
    assert!(store.is_empty()); // nothing resurrected
}

#[test]
fn last_write_wins_for_same_element() {
    let mut store = ElementStore::new();
    store.add_element(text_at("text-1", 0.0, 0.0));

    // Update A (local), then update B (remote): B's fields win.
    store.update_element("text-1", &ElementPatch { position: Some(Position::new(10.0, 10.0)), ..Default::default() });
    let mut remote = text_at("text-1", 77.0, 88.0);
    remote.set_size(Size::new(400.0, 90.0));
    store.upsert_element(remote);

    let element = store.get("text-1").unwrap();
    assert_eq!(element.position(), Position::new(77.0, 88.0));
    assert_eq!(element.size(), Size::new(400.0, 90.0));
}

#[test]
fn last_write_wins_regardless_of_writer_order() {
    let mut store = ElementStore::new();
    store.add_element(text_at("text-1", 0.0, 0.0));

    // Remote full-element first, then a local patch: the patch wins.
    store.upsert_element(text_at("text-1", 30.0, 30.0));
    store.update_element("text-1", &ElementPatch { position: Some(Position::new(5.0, 5.0)), ..Default::default() });
    assert_eq!(store.get("text-1").unwrap().position(), Position::new(5.0, 5.0));
}

#[test]
fn upsert_unknown_id_appends() {
    let mut store = ElementStore::new();
    store.upsert_element(shape("shape-1"));
    assert_eq!(store.len(), 1);
}

// =============================================================
// connectors
// =============================================================

#[test]
fn add_and_remove_connector() {
    let mut store = ElementStore::new();
    store.add_connector(link("connector-1", "a", "b"));
    assert_eq!(store.connectors().len(), 1);
    assert!(store.remove_connector("connector-1").is_some());
    assert!(store.connectors().is_empty());
    assert!(store.remove_connector("connector-1").is_none());
}

#[test]
fn duplicate_connector_id_replaces() {
    let mut store = ElementStore::new();
    store.add_connector(link("connector-1", "a", "b"));
    store.add_connector(link("connector-1", "a", "c"));
    assert_eq!(store.connectors().len(), 1);
    assert_eq!(store.connectors()[0].to.element_id, "c");
}

#[test]
fn deleting_element_leaves_connectors_dangling() {
    let mut store = ElementStore::new();
    store.add_element(shape("shape-1"));
    store.add_element(shape("shape-2"));
    store.add_element(shape("shape-3"));
    store.add_connector(link("connector-1", "shape-1", "shape-2"));
    store.add_connector(link("connector-2", "shape-3", "shape-1"));

    store.remove_element("shape-1");

    // Both connectors survive in the sequence but resolve to nothing.
    assert_eq!(store.connectors().len(), 2);
    assert!(store.resolved_connectors().is_empty());
}

#[test]
fn resolved_connectors_use_live_anchor_geometry() {
    let mut store = ElementStore::new();
    let mut a = shape("shape-1");
    a.set_position(Position::new(100.0, 100.0));
    a.set_size(Size::new(200.0, 100.0));
    let mut b = shape("shape-2");
    b.set_position(Position::new(500.0, 100.0));
    b.set_size(Size::new(200.0, 100.0));
    store.add_element(a);
    store.add_element(b);
    store.add_connector(link("connector-1", "shape-1", "shape-2"));

    let resolved = store.resolved_connectors();
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].from, Position::new(300.0, 150.0)); // right midpoint of a
    assert_eq!(resolved[0].to, Position::new(500.0, 150.0)); // left midpoint of b

    // Moving the endpoint element moves the anchor on the next resolve.
    store.update_element("shape-2", &ElementPatch { position: Some(Position::new(600.0, 100.0)), ..Default::default() });
    let resolved = store.resolved_connectors();
    assert_eq!(resolved[0].to, Position::new(600.0, 150.0));
}

// =============================================================
// replace_all / documents
// =============================================================

#[test]
fn replace_all_swaps_whole_document() {
    let mut store = ElementStore::new();
    store.add_element(text_at("old", 0.0, 0.0));
    store.add_connector(link("connector-old", "old", "older"));

    store.replace_all(vec![shape("new-1"), shape("new-2")], vec![link("connector-new", "new-1", "new-2")]);

    assert_eq!(store.len(), 2);
    assert!(store.get("old").is_none());
    assert_eq!(store.connectors()[0].id, "connector-new");
}

#[test]
fn to_document_roundtrips_through_store() {
    let mut store = ElementStore::new();
    store.add_element(shape("shape-1"));
    store.add_connector(link("connector-1", "shape-1", "shape-1"));

    let doc = store.to_document();
    let mut restored = ElementStore::new();
    restored.replace_all(doc.elements.clone(), doc.connectors.clone());
    assert_eq!(restored.to_document(), doc);
}

#[test]
fn card_document_deserializes_missing_fields_as_empty() {
    let doc: CardDocument = serde_json::from_str("{}").unwrap();
    assert!(doc.elements.is_empty());
    assert!(doc.connectors.is_empty());
}
