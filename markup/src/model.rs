//! Annotation entities: layers, boxes, connections, groups, and the sparse
//! patch types used to edit them.
//!
//! All coordinates are page-local and unscaled. Every entity serializes with
//! camelCase field names, which is also the export file format.

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{DEFAULT_CONNECTION_COLOR, DEFAULT_CONNECTION_WIDTH, DEFAULT_LAYER_ID};
use crate::geometry::Rect;

/// Unique identifier for a box.
pub type BoxId = Uuid;

/// Unique identifier for a connection.
pub type ConnectionId = Uuid;

/// Unique identifier for a group.
pub type GroupId = Uuid;

/// Current time as milliseconds since the Unix epoch.
#[must_use]
pub fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

// =============================================================================
// IDS AND KEYS
// =============================================================================

/// Layer identifier. Generated layers use UUID text; the reserved layer is `"default"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(String);

impl LayerId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random id for a newly created layer.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Id of the reserved default layer.
    #[must_use]
    pub fn default_layer() -> Self {
        Self(DEFAULT_LAYER_ID.to_owned())
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_LAYER_ID
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for LayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Composite key of a page partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageKey {
    pub document_id: String,
    pub page_number: u32,
}

impl PageKey {
    #[must_use]
    pub fn new(document_id: impl Into<String>, page_number: u32) -> Self {
        Self { document_id: document_id.into(), page_number }
    }
}

// =============================================================================
// LAYER
// =============================================================================

/// A named, colored, toggleable grouping of boxes, connections and groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    /// Hex color, `#RRGGBB`.
    pub color: String,
    pub visible: bool,
}

// =============================================================================
// BOX
// =============================================================================

/// A rectangular annotation on one page, owned by one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationBox {
    pub id: BoxId,
    #[serde(default)]
    pub document_id: String,
    pub layer_id: LayerId,
    pub page_number: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub text: String,
    pub color: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl AnnotationBox {
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    #[must_use]
    pub fn page_key(&self) -> PageKey {
        PageKey::new(self.document_id.clone(), self.page_number)
    }

    /// Whether the box lives on `document_id` / `page_number`.
    #[must_use]
    pub fn is_on(&self, document_id: &str, page_number: u32) -> bool {
        self.page_number == page_number && self.document_id == document_id
    }
}

/// Sparse update for a box. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoxPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Move the box to another (live) layer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer_id: Option<LayerId>,
}

// =============================================================================
// CONNECTION
// =============================================================================

/// Visual style of a connector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConnectionStyle {
    pub color: String,
    pub width: f64,
    pub dashed: bool,
    pub arrow_head: bool,
}

impl Default for ConnectionStyle {
    fn default() -> Self {
        Self {
            color: DEFAULT_CONNECTION_COLOR.to_owned(),
            width: DEFAULT_CONNECTION_WIDTH,
            dashed: false,
            arrow_head: true,
        }
    }
}

/// A link between two boxes on the same page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: ConnectionId,
    pub document_id: String,
    pub page_number: u32,
    pub start_box_id: BoxId,
    pub end_box_id: BoxId,
    pub layer_id: LayerId,
    pub style: ConnectionStyle,
}

impl Connection {
    #[must_use]
    pub fn touches(&self, box_id: BoxId) -> bool {
        self.start_box_id == box_id || self.end_box_id == box_id
    }
}

/// Sparse update for a connection's endpoints and style.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConnectionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_box_id: Option<BoxId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_box_id: Option<BoxId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrow_head: Option<bool>,
}

impl ConnectionPatch {
    fn apply_style(&self, style: &mut ConnectionStyle) {
        if let Some(ref color) = self.color {
            style.color.clone_from(color);
        }
        if let Some(width) = self.width {
            style.width = width;
        }
        if let Some(dashed) = self.dashed {
            style.dashed = dashed;
        }
        if let Some(arrow_head) = self.arrow_head {
            style.arrow_head = arrow_head;
        }
    }

    pub(crate) fn apply_to(&self, conn: &mut Connection) {
        if let Some(start) = self.start_box_id {
            conn.start_box_id = start;
        }
        if let Some(end) = self.end_box_id {
            conn.end_box_id = end;
        }
        self.apply_style(&mut conn.style);
    }
}

// =============================================================================
// GROUP
// =============================================================================

/// A named set of boxes on one page and layer, with their bounding envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub document_id: String,
    pub layer_id: LayerId,
    pub page_number: u32,
    /// Member ids in first-seen order, without duplicates.
    pub box_ids: Vec<BoxId>,
    /// Envelope of the members at creation or last explicit update.
    pub bounds: Rect,
    pub color: String,
    pub created_at: i64,
}

/// Sparse update for a group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GroupPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Replace the member set; bounds are recomputed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub box_ids: Option<Vec<BoxId>>,
}
