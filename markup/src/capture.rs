//! Region-capture request shaping.
//!
//! The capture service crops a rendered page region into an image. It is an
//! external collaborator; this module only builds the body it expects, with
//! every number rounded to an integer and snake_case field names.

#[cfg(test)]
#[path = "capture_test.rs"]
mod capture_test;

use serde::{Deserialize, Serialize};

use crate::model::{AnnotationBox, BoxId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRequest {
    pub box_id: BoxId,
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
    pub viewer_width: i64,
    pub viewer_height: i64,
}

#[allow(clippy::cast_possible_truncation)]
fn round(value: f64) -> i64 {
    // `as` saturates; NaN becomes 0.
    value.round() as i64
}

impl CaptureRequest {
    /// Request body for capturing `annotation` as seen in a viewer of the
    /// given size.
    #[must_use]
    pub fn for_box(annotation: &AnnotationBox, viewer_width: f64, viewer_height: f64) -> Self {
        Self {
            box_id: annotation.id,
            x: round(annotation.x),
            y: round(annotation.y),
            width: round(annotation.width),
            height: round(annotation.height),
            viewer_width: round(viewer_width),
            viewer_height: round(viewer_height),
        }
    }
}
