//! Connector geometry: where a connector leaves a box, how it curves, and
//! whether a pointer lands on it.
//!
//! Everything here is a pure function of its arguments. Degenerate inputs
//! (coincident centers, zero-length segments, zero-sized boxes) resolve to
//! fixed fallback values rather than NaN or an error.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

use crate::consts::CONTROL_POINT_DIVISOR;

/// A point in page-local, unscaled coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance_to(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Axis-aligned rectangle; `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether `point` lies inside the rectangle, edges included.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Smallest rectangle enclosing every rectangle in `rects`, or `None` when empty.
    #[must_use]
    pub fn envelope(rects: impl IntoIterator<Item = Rect>) -> Option<Rect> {
        let mut iter = rects.into_iter();
        let first = iter.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.right(), first.bottom());
        for r in iter {
            min_x = min_x.min(r.x);
            min_y = min_y.min(r.y);
            max_x = max_x.max(r.right());
            max_y = max_y.max(r.bottom());
        }
        Some(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }
}

/// Endpoints and cubic bezier control points of one rendered connector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectorPath {
    pub start: Point,
    pub cp1: Point,
    pub cp2: Point,
    pub end: Point,
}

/// Center of `rect`.
#[must_use]
pub fn center(rect: &Rect) -> Point {
    Point::new(rect.x + rect.width / 2.0, rect.y + rect.height / 2.0)
}

fn is_degenerate_slope(tan: f64) -> bool {
    !tan.is_finite() || tan.abs() < f64::EPSILON
}

/// Point where the ray from `from` toward `to`, re-anchored at the center of
/// `rect`, crosses the rectangle's boundary.
///
/// The ray leaves through the left/right edge when `|cos| * half_h >
/// |sin| * half_w`, otherwise through the top/bottom edge. A slope that is
/// zero or infinite falls back to a straight horizontal or vertical exit.
#[must_use]
pub fn find_intersection_point(rect: &Rect, from: Point, to: Point) -> Point {
    let c = center(rect);
    let angle = (to.y - from.y).atan2(to.x - from.x);
    let (sin, cos) = angle.sin_cos();
    let tan = angle.tan();
    let half_w = rect.width / 2.0;
    let half_h = rect.height / 2.0;

    if cos.abs() * half_h > sin.abs() * half_w {
        let x = if cos >= 0.0 { c.x + half_w } else { c.x - half_w };
        let y = if is_degenerate_slope(tan) { c.y } else { c.y + tan * (x - c.x) };
        Point::new(x, y)
    } else {
        let y = if sin >= 0.0 { c.y + half_h } else { c.y - half_h };
        let x = if !tan.is_finite() {
            c.x
        } else if tan.abs() < f64::EPSILON {
            if cos >= 0.0 { c.x + half_w } else { c.x - half_w }
        } else {
            c.x + (y - c.y) / tan
        };
        Point::new(x, y)
    }
}

/// Boundary points where a connector between two boxes starts and ends.
#[must_use]
pub fn connection_endpoints(start_rect: &Rect, end_rect: &Rect) -> (Point, Point) {
    let start_center = center(start_rect);
    let end_center = center(end_rect);
    (
        find_intersection_point(start_rect, start_center, end_center),
        find_intersection_point(end_rect, end_center, start_center),
    )
}

/// Bezier control points a third of the way in from each endpoint along the
/// straight line. A zero-length connector collapses both onto `start`.
#[must_use]
pub fn control_points(start: Point, end: Point) -> (Point, Point) {
    let distance = start.distance_to(end);
    if distance == 0.0 {
        return (start, start);
    }
    let control_distance = distance / CONTROL_POINT_DIVISOR;
    let (sin, cos) = (end.y - start.y).atan2(end.x - start.x).sin_cos();
    let cp1 = Point::new(start.x + control_distance * cos, start.y + control_distance * sin);
    let cp2 = Point::new(end.x - control_distance * cos, end.y - control_distance * sin);
    (cp1, cp2)
}

/// Full connector geometry between two boxes.
#[must_use]
pub fn connector_path(start_rect: &Rect, end_rect: &Rect) -> ConnectorPath {
    let (start, end) = connection_endpoints(start_rect, end_rect);
    let (cp1, cp2) = control_points(start, end);
    ConnectorPath { start, cp1, cp2, end }
}

/// Perpendicular distance from `point` to the infinite line through `start`
/// and `end`. `None` when the two points coincide.
#[must_use]
pub fn distance_to_line(point: Point, start: Point, end: Point) -> Option<f64> {
    let length = start.distance_to(end);
    if length == 0.0 {
        return None;
    }
    let cross = (end.y - start.y) * point.x - (end.x - start.x) * point.y + end.x * start.y - end.y * start.x;
    Some(cross.abs() / length)
}

/// Whether `point` is within `threshold` of the line through `start` and `end`.
/// A zero-length segment never matches.
#[must_use]
pub fn is_point_near_line(point: Point, start: Point, end: Point, threshold: f64) -> bool {
    distance_to_line(point, start, end).is_some_and(|d| d <= threshold)
}
