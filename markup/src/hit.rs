#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use serde::Serialize;

use crate::boxes::BoxOrder;
use crate::geometry::{Point, connection_endpoints, is_point_near_line};
use crate::model::{AnnotationBox, Connection, PageKey};
use crate::store::Annotations;

/// What a page point landed on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Hit {
    Connection { connection: Connection },
    Box { annotation: AnnotationBox },
}

/// Topmost box on a visible layer containing `point`. Later boxes on the
/// page sit above earlier ones; edges count as inside.
#[must_use]
pub fn box_at(annotations: &Annotations, key: &PageKey, point: Point) -> Option<AnnotationBox> {
    let layers = annotations.layers();
    annotations
        .boxes()
        .list(key, None, BoxOrder::Insertion)
        .into_iter()
        .rev()
        .find(|b| layers.is_visible(&b.layer_id) && b.rect().contains(point))
}

/// Topmost (most recently drawn) connection on a visible layer whose segment
/// passes within `threshold` of `point`. The point must also fall inside the
/// segment's bounding box grown by `threshold`, so clicks on the line's
/// extension past either end miss.
#[must_use]
pub fn connection_at(annotations: &Annotations, key: &PageKey, point: Point, threshold: f64) -> Option<Connection> {
    let layers = annotations.layers();
    let boxes = annotations.boxes();
    annotations.connections_for_page(key, None).into_iter().rev().find(|conn| {
        if !layers.is_visible(&conn.layer_id) {
            return false;
        }
        let (Some(start), Some(end)) = (boxes.get(conn.start_box_id), boxes.get(conn.end_box_id)) else {
            return false;
        };
        let (a, b) = connection_endpoints(&start.rect(), &end.rect());
        let within_span = point.x >= a.x.min(b.x) - threshold
            && point.x <= a.x.max(b.x) + threshold
            && point.y >= a.y.min(b.y) - threshold
            && point.y <= a.y.max(b.y) + threshold;
        within_span && is_point_near_line(point, a, b, threshold)
    })
}

/// Connections are thin and drawn above boxes, so they win ties.
#[must_use]
pub fn hit_test(annotations: &Annotations, key: &PageKey, point: Point, threshold: f64) -> Option<Hit> {
    if let Some(connection) = connection_at(annotations, key, point, threshold) {
        return Some(Hit::Connection { connection });
    }
    box_at(annotations, key, point).map(|annotation| Hit::Box { annotation })
}
