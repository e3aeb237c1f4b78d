#![allow(clippy::float_cmp)]

use super::*;

fn page(n: u32) -> PageKey {
    PageKey::new("doc", n)
}

fn add(store: &mut BoxStore, key: &PageKey, layer: &str, rect: Rect) -> AnnotationBox {
    store.insert(key, LayerId::from(layer), rect, String::new(), "#000000".into())
}

// =============================================================
// insert
// =============================================================

#[test]
fn insert_stamps_ids_and_timestamps() {
    let mut store = BoxStore::new();
    let b = store.insert(&page(1), LayerId::default_layer(), Rect::new(1.0, 2.0, 30.0, 40.0), "hi".into(), "#fff".into());
    assert_eq!(b.created_at, b.updated_at);
    assert!(b.created_at > 0);
    assert_eq!(b.text, "hi");
    assert_eq!(b.document_id, "doc");
    assert_eq!(b.page_number, 1);
    assert_eq!(store.get(b.id), Some(&b));
    assert!(store.has_page(&page(1)));
}

#[test]
fn insert_generates_unique_ids() {
    let mut store = BoxStore::new();
    let a = add(&mut store, &page(1), "default", Rect::new(0.0, 0.0, 30.0, 30.0));
    let b = add(&mut store, &page(1), "default", Rect::new(0.0, 0.0, 30.0, 30.0));
    assert_ne!(a.id, b.id);
    assert_eq!(store.len(), 2);
}

#[test]
fn insert_clamps_tiny_rect_keeping_origin() {
    let mut store = BoxStore::new();
    let b = add(&mut store, &page(1), "default", Rect::new(5.0, 6.0, 3.0, 4.0));
    assert_eq!((b.x, b.y, b.width, b.height), (5.0, 6.0, 20.0, 20.0));
}

// =============================================================
// update
// =============================================================

#[test]
fn update_merges_fields_and_refreshes_updated_at() {
    let mut store = BoxStore::new();
    let b = add(&mut store, &page(1), "default", Rect::new(0.0, 0.0, 50.0, 50.0));
    let patch = BoxPatch { text: Some("new".into()), x: Some(10.0), ..BoxPatch::default() };
    let updated = store.update(b.id, &patch).unwrap();
    assert_eq!(updated.text, "new");
    assert_eq!(updated.x, 10.0);
    assert_eq!(updated.y, 0.0);
    assert_eq!(updated.width, 50.0);
    assert!(updated.updated_at >= b.updated_at);
    assert_eq!(updated.created_at, b.created_at);
}

#[test]
fn update_missing_box_is_noop() {
    let mut store = BoxStore::new();
    assert!(store.update(Uuid::new_v4(), &BoxPatch::default()).is_none());
    assert!(store.is_empty());
}

#[test]
fn resize_from_right_edge_clamps_keeping_left_edge() {
    let mut store = BoxStore::new();
    let b = add(&mut store, &page(1), "default", Rect::new(100.0, 100.0, 50.0, 50.0));
    let patch = BoxPatch { width: Some(5.0), ..BoxPatch::default() };
    let updated = store.update(b.id, &patch).unwrap();
    assert_eq!(updated.width, 20.0);
    assert_eq!(updated.x, 100.0);
}

#[test]
fn resize_from_left_edge_clamps_keeping_right_edge() {
    let mut store = BoxStore::new();
    let b = add(&mut store, &page(1), "default", Rect::new(100.0, 100.0, 50.0, 50.0));
    // Dragging the left handle 45 units right: right edge stays at 150.
    let patch = BoxPatch { x: Some(145.0), width: Some(5.0), ..BoxPatch::default() };
    let updated = store.update(b.id, &patch).unwrap();
    assert_eq!(updated.width, 20.0);
    assert_eq!(updated.x, 130.0);
    assert_eq!(updated.x + updated.width, 150.0);
}

#[test]
fn resize_from_top_edge_clamps_keeping_bottom_edge() {
    let mut store = BoxStore::new();
    let b = add(&mut store, &page(1), "default", Rect::new(0.0, 0.0, 50.0, 60.0));
    let patch = BoxPatch { y: Some(50.0), height: Some(10.0), ..BoxPatch::default() };
    let updated = store.update(b.id, &patch).unwrap();
    assert_eq!(updated.height, 20.0);
    assert_eq!(updated.y + updated.height, 60.0);
}

#[test]
fn resize_from_bottom_edge_clamps_keeping_top_edge() {
    let mut store = BoxStore::new();
    let b = add(&mut store, &page(1), "default", Rect::new(0.0, 7.0, 50.0, 60.0));
    let patch = BoxPatch { height: Some(-30.0), ..BoxPatch::default() };
    let updated = store.update(b.id, &patch).unwrap();
    assert_eq!(updated.height, 20.0);
    assert_eq!(updated.y, 7.0);
}

#[test]
fn full_rect_patch_with_unchanged_origin_keeps_origin() {
    let mut store = BoxStore::new();
    let b = add(&mut store, &page(1), "default", Rect::new(0.0, 0.0, 100.0, 100.0));
    // Bottom-right drag that resends the whole rect.
    let patch = BoxPatch { x: Some(0.0), y: Some(0.0), width: Some(10.0), height: Some(10.0), ..BoxPatch::default() };
    let updated = store.update(b.id, &patch).unwrap();
    assert_eq!((updated.x, updated.y), (0.0, 0.0));
    assert_eq!((updated.width, updated.height), (20.0, 20.0));
}

#[test]
fn resize_to_exact_minimum_is_untouched() {
    let mut store = BoxStore::new();
    let b = add(&mut store, &page(1), "default", Rect::new(0.0, 0.0, 50.0, 50.0));
    let patch = BoxPatch { x: Some(30.0), width: Some(20.0), ..BoxPatch::default() };
    let updated = store.update(b.id, &patch).unwrap();
    assert_eq!((updated.x, updated.width), (30.0, 20.0));
}

// =============================================================
// remove
// =============================================================

#[test]
fn remove_is_idempotent() {
    let mut store = BoxStore::new();
    let b = add(&mut store, &page(1), "default", Rect::new(0.0, 0.0, 50.0, 50.0));
    assert_eq!(store.remove(b.id).map(|r| r.id), Some(b.id));
    assert!(store.remove(b.id).is_none());
    assert!(store.list(&page(1), None, BoxOrder::Insertion).is_empty());
    assert!(store.has_page(&page(1)));
}

#[test]
fn remove_layer_spans_pages() {
    let mut store = BoxStore::new();
    add(&mut store, &page(1), "a", Rect::new(0.0, 0.0, 50.0, 50.0));
    add(&mut store, &page(2), "a", Rect::new(0.0, 0.0, 50.0, 50.0));
    let keep = add(&mut store, &page(2), "b", Rect::new(0.0, 0.0, 50.0, 50.0));
    let removed = store.remove_layer(&LayerId::from("a"));
    assert_eq!(removed.len(), 2);
    assert_eq!(store.len(), 1);
    assert!(store.get(keep.id).is_some());
}

// =============================================================
// listing
// =============================================================

#[test]
fn list_keeps_insertion_order_and_filters_layer() {
    let mut store = BoxStore::new();
    let a = add(&mut store, &page(1), "a", Rect::new(0.0, 300.0, 50.0, 50.0));
    let b = add(&mut store, &page(1), "b", Rect::new(0.0, 100.0, 50.0, 50.0));
    let c = add(&mut store, &page(1), "a", Rect::new(0.0, 200.0, 50.0, 50.0));
    add(&mut store, &page(2), "a", Rect::new(0.0, 0.0, 50.0, 50.0));

    let ids: Vec<BoxId> = store.list(&page(1), None, BoxOrder::Insertion).iter().map(|x| x.id).collect();
    assert_eq!(ids, vec![a.id, b.id, c.id]);

    let layer_a = LayerId::from("a");
    let ids: Vec<BoxId> = store.list(&page(1), Some(&layer_a), BoxOrder::Insertion).iter().map(|x| x.id).collect();
    assert_eq!(ids, vec![a.id, c.id]);
}

#[test]
fn list_position_order_sorts_by_y() {
    let mut store = BoxStore::new();
    let a = add(&mut store, &page(1), "a", Rect::new(0.0, 300.0, 50.0, 50.0));
    let b = add(&mut store, &page(1), "a", Rect::new(0.0, 100.0, 50.0, 50.0));
    let c = add(&mut store, &page(1), "a", Rect::new(0.0, 200.0, 50.0, 50.0));
    let ids: Vec<BoxId> = store.list(&page(1), None, BoxOrder::Position).iter().map(|x| x.id).collect();
    assert_eq!(ids, vec![b.id, c.id, a.id]);
}

#[test]
fn layer_boxes_position_order_breaks_ties_by_page() {
    let mut store = BoxStore::new();
    let late = add(&mut store, &page(3), "a", Rect::new(0.0, 50.0, 50.0, 50.0));
    let early = add(&mut store, &page(1), "a", Rect::new(0.0, 50.0, 50.0, 50.0));
    let top = add(&mut store, &page(2), "a", Rect::new(0.0, 10.0, 50.0, 50.0));
    let ids: Vec<BoxId> =
        store.layer_boxes(Some("doc"), &LayerId::from("a"), BoxOrder::Position).iter().map(|x| x.id).collect();
    assert_eq!(ids, vec![top.id, early.id, late.id]);
}

#[test]
fn layer_boxes_filters_document() {
    let mut store = BoxStore::new();
    add(&mut store, &PageKey::new("one", 1), "a", Rect::new(0.0, 0.0, 50.0, 50.0));
    add(&mut store, &PageKey::new("two", 1), "a", Rect::new(0.0, 0.0, 50.0, 50.0));
    let layer = LayerId::from("a");
    assert_eq!(store.layer_boxes(Some("one"), &layer, BoxOrder::Insertion).len(), 1);
    assert_eq!(store.layer_boxes(None, &layer, BoxOrder::Insertion).len(), 2);
}

#[test]
fn list_unknown_page_is_empty() {
    let store = BoxStore::new();
    assert!(store.list(&page(42), None, BoxOrder::Insertion).is_empty());
}

#[test]
fn reassign_layer_moves_boxes() {
    let mut store = BoxStore::new();
    let b = add(&mut store, &page(1), "a", Rect::new(0.0, 0.0, 50.0, 50.0));
    assert_eq!(store.reassign_layer(&LayerId::from("a"), &LayerId::from("b")), 1);
    assert_eq!(store.get(b.id).map(|x| x.layer_id.clone()), Some(LayerId::from("b")));
}

#[test]
fn box_order_deserializes_lowercase() {
    let order: BoxOrder = serde_json::from_str("\"position\"").unwrap();
    assert_eq!(order, BoxOrder::Position);
    assert_eq!(BoxOrder::default(), BoxOrder::Insertion);
}
