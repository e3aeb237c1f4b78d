use super::*;
use crate::consts::HIT_THRESHOLD;
use crate::geometry::Rect;
use crate::model::LayerId;

fn key() -> PageKey {
    PageKey::new("doc", 1)
}

/// Two 100x50 boxes side by side, connected along y = 25 from x = 100 to 200.
fn scene() -> (Annotations, AnnotationBox, AnnotationBox, Connection) {
    let mut engine = Annotations::new();
    let a = engine.add_box(&key(), None, Rect::new(0.0, 0.0, 100.0, 50.0), "a".into(), None).unwrap();
    let b = engine.add_box(&key(), None, Rect::new(200.0, 0.0, 100.0, 50.0), "b".into(), None).unwrap();
    let conn = engine.add_connection(a.id, b.id, None, None).unwrap();
    (engine, a, b, conn)
}

// =============================================================
// box_at
// =============================================================

#[test]
fn box_at_finds_containing_box_with_inclusive_edges() {
    let (engine, a, b, _) = scene();
    assert_eq!(box_at(&engine, &key(), Point::new(50.0, 25.0)).map(|x| x.id), Some(a.id));
    assert_eq!(box_at(&engine, &key(), Point::new(300.0, 50.0)).map(|x| x.id), Some(b.id));
    assert!(box_at(&engine, &key(), Point::new(150.0, 25.0)).is_none());
}

#[test]
fn box_at_prefers_topmost() {
    let (mut engine, a, _, _) = scene();
    let over = engine.add_box(&key(), None, Rect::new(10.0, 10.0, 30.0, 30.0), "over".into(), None).unwrap();
    assert_eq!(box_at(&engine, &key(), Point::new(20.0, 20.0)).map(|x| x.id), Some(over.id));
    assert_eq!(box_at(&engine, &key(), Point::new(80.0, 5.0)).map(|x| x.id), Some(a.id));
}

#[test]
fn box_at_skips_hidden_layers() {
    let (mut engine, _, _, _) = scene();
    engine.toggle_visibility(&LayerId::default_layer());
    assert!(box_at(&engine, &key(), Point::new(50.0, 25.0)).is_none());
}

#[test]
fn box_at_is_page_scoped() {
    let (engine, _, _, _) = scene();
    assert!(box_at(&engine, &PageKey::new("doc", 2), Point::new(50.0, 25.0)).is_none());
}

// =============================================================
// connection_at
// =============================================================

#[test]
fn connection_at_threshold_is_inclusive() {
    let (engine, _, _, conn) = scene();
    let on = connection_at(&engine, &key(), Point::new(150.0, 25.0 + HIT_THRESHOLD), HIT_THRESHOLD);
    assert_eq!(on.map(|c| c.id), Some(conn.id));
    assert!(connection_at(&engine, &key(), Point::new(150.0, 25.0 + HIT_THRESHOLD + 1e-6), HIT_THRESHOLD).is_none());
}

#[test]
fn connection_at_ignores_line_extension() {
    let (engine, _, _, _) = scene();
    assert!(connection_at(&engine, &key(), Point::new(400.0, 25.0), HIT_THRESHOLD).is_none());
    assert!(connection_at(&engine, &key(), Point::new(204.0, 25.0), HIT_THRESHOLD).is_some());
}

#[test]
fn connection_at_skips_hidden_layers() {
    let (mut engine, _, _, _) = scene();
    engine.set_visibility(&LayerId::default_layer(), false);
    assert!(connection_at(&engine, &key(), Point::new(150.0, 25.0), HIT_THRESHOLD).is_none());
}

#[test]
fn connection_at_prefers_latest_drawn() {
    let (mut engine, a, b, _) = scene();
    let newer = engine.add_connection(b.id, a.id, None, None).unwrap();
    let hit = connection_at(&engine, &key(), Point::new(150.0, 25.0), HIT_THRESHOLD);
    assert_eq!(hit.map(|c| c.id), Some(newer.id));
}

// =============================================================
// hit_test
// =============================================================

#[test]
fn hit_test_prefers_connections() {
    let (engine, a, _, conn) = scene();
    // Inside box `a` and within threshold of the connector start.
    match hit_test(&engine, &key(), Point::new(98.0, 25.0), HIT_THRESHOLD) {
        Some(Hit::Connection { connection }) => assert_eq!(connection.id, conn.id),
        other => panic!("expected connection hit, got {other:?}"),
    }
    match hit_test(&engine, &key(), Point::new(20.0, 20.0), HIT_THRESHOLD) {
        Some(Hit::Box { annotation }) => assert_eq!(annotation.id, a.id),
        other => panic!("expected box hit, got {other:?}"),
    }
    assert!(hit_test(&engine, &key(), Point::new(150.0, 400.0), HIT_THRESHOLD).is_none());
}

#[test]
fn hit_serializes_with_kind_tag() {
    let (engine, _, _, _) = scene();
    let hit = hit_test(&engine, &key(), Point::new(20.0, 20.0), HIT_THRESHOLD).unwrap();
    let value = serde_json::to_value(hit).unwrap();
    assert_eq!(value["kind"], serde_json::json!("box"));
    assert_eq!(value["annotation"]["text"], serde_json::json!("a"));
}
