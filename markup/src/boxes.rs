//! Box store: boxes in an arena keyed by id, indexed by page partition.
//!
//! Each `(document, page)` partition keeps its box ids in insertion order.
//! Partitions are created on first access, so asking about a page nobody has
//! touched yet is never an error. Layer liveness is checked by the caller
//! (`store::Annotations`); this module only owns the boxes themselves.

#[cfg(test)]
#[path = "boxes_test.rs"]
mod boxes_test;

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::MIN_BOX_SIZE;
use crate::geometry::Rect;
use crate::model::{AnnotationBox, BoxId, BoxPatch, LayerId, PageKey, now_ms};

/// Ordering for box listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxOrder {
    /// Order of creation within each page.
    #[default]
    Insertion,
    /// `y` ascending, ties broken by page number, then by creation order.
    Position,
}

/// Clamp one axis of a resize. When the origin moved with the resize (the
/// handle is on the leading edge) the trailing edge stays where the patch put
/// it; otherwise the origin stays put.
fn clamp_extent(origin: f64, extent: f64, origin_moved: bool) -> (f64, f64) {
    if extent >= MIN_BOX_SIZE {
        return (origin, extent);
    }
    if origin_moved && extent.is_finite() {
        (origin + extent - MIN_BOX_SIZE, MIN_BOX_SIZE)
    } else {
        (origin, MIN_BOX_SIZE)
    }
}

/// Clamp a freshly drawn rectangle to the minimum size, keeping its top-left.
#[must_use]
pub fn clamp_rect(rect: Rect) -> Rect {
    let (x, width) = clamp_extent(rect.x, rect.width, false);
    let (y, height) = clamp_extent(rect.y, rect.height, false);
    Rect::new(x, y, width, height)
}

fn sort_boxes(boxes: &mut [AnnotationBox], order: BoxOrder) {
    if order == BoxOrder::Position {
        boxes.sort_by(|a, b| a.y.total_cmp(&b.y).then_with(|| a.page_number.cmp(&b.page_number)));
    }
}

/// Arena of boxes with a per-page insertion-order index.
#[derive(Debug, Default)]
pub struct BoxStore {
    boxes: HashMap<BoxId, AnnotationBox>,
    pages: BTreeMap<PageKey, Vec<BoxId>>,
}

impl BoxStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure the partition for `key` exists.
    pub fn ensure_page(&mut self, key: &PageKey) {
        if !self.pages.contains_key(key) {
            tracing::debug!(document = %key.document_id, page = key.page_number, "initialized page partition");
            self.pages.insert(key.clone(), Vec::new());
        }
    }

    /// Whether a partition has been initialized for `key`.
    #[must_use]
    pub fn has_page(&self, key: &PageKey) -> bool {
        self.pages.contains_key(key)
    }

    /// Create a box on a page. Sizes below the minimum are clamped.
    pub(crate) fn insert(
        &mut self,
        key: &PageKey,
        layer_id: LayerId,
        rect: Rect,
        text: String,
        color: String,
    ) -> AnnotationBox {
        let rect = clamp_rect(rect);
        let now = now_ms();
        let annotation = AnnotationBox {
            id: Uuid::new_v4(),
            document_id: key.document_id.clone(),
            layer_id,
            page_number: key.page_number,
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            text,
            color,
            created_at: now,
            updated_at: now,
        };
        self.insert_box(annotation.clone());
        annotation
    }

    /// Insert a fully formed box, appending it to its page partition. A box
    /// with an id already in the store replaces it in place.
    pub(crate) fn insert_box(&mut self, annotation: AnnotationBox) {
        let key = annotation.page_key();
        let id = annotation.id;
        if let Some(previous) = self.boxes.insert(id, annotation) {
            let previous_key = previous.page_key();
            if previous_key == key {
                return;
            }
            if let Some(ids) = self.pages.get_mut(&previous_key) {
                ids.retain(|candidate| *candidate != id);
            }
        }
        self.pages.entry(key).or_default().push(id);
    }

    /// Apply a sparse update. `updated_at` is always refreshed. Returns the
    /// updated box, or `None` if no box has that id.
    #[allow(clippy::float_cmp)]
    pub(crate) fn update(&mut self, id: BoxId, patch: &BoxPatch) -> Option<AnnotationBox> {
        let annotation = self.boxes.get_mut(&id)?;
        // Only an origin that actually changed means the near edge was dragged.
        let x_moved = patch.x.is_some_and(|x| x != annotation.x);
        let y_moved = patch.y.is_some_and(|y| y != annotation.y);

        if let Some(x) = patch.x {
            annotation.x = x;
        }
        if let Some(y) = patch.y {
            annotation.y = y;
        }
        if let Some(width) = patch.width {
            (annotation.x, annotation.width) = clamp_extent(annotation.x, width, x_moved);
        }
        if let Some(height) = patch.height {
            (annotation.y, annotation.height) = clamp_extent(annotation.y, height, y_moved);
        }
        if let Some(ref text) = patch.text {
            annotation.text.clone_from(text);
        }
        if let Some(ref color) = patch.color {
            annotation.color.clone_from(color);
        }
        if let Some(ref layer_id) = patch.layer_id {
            annotation.layer_id = layer_id.clone();
        }
        annotation.updated_at = now_ms().max(annotation.created_at);

        Some(annotation.clone())
    }

    /// Remove a box, returning it if it was present.
    pub(crate) fn remove(&mut self, id: BoxId) -> Option<AnnotationBox> {
        let removed = self.boxes.remove(&id)?;
        if let Some(ids) = self.pages.get_mut(&removed.page_key()) {
            ids.retain(|candidate| *candidate != id);
        }
        Some(removed)
    }

    /// Remove every box on `layer_id`, across all pages.
    pub(crate) fn remove_layer(&mut self, layer_id: &LayerId) -> Vec<AnnotationBox> {
        let ids: Vec<BoxId> = self.iter().filter(|b| &b.layer_id == layer_id).map(|b| b.id).collect();
        ids.into_iter().filter_map(|id| self.remove(id)).collect()
    }

    /// Move every box on `from` to `to`. Returns how many moved.
    pub(crate) fn reassign_layer(&mut self, from: &LayerId, to: &LayerId) -> usize {
        let mut moved = 0;
        for annotation in self.boxes.values_mut().filter(|b| &b.layer_id == from) {
            annotation.layer_id = to.clone();
            moved += 1;
        }
        moved
    }

    /// Return a reference to a box by id.
    #[must_use]
    pub fn get(&self, id: BoxId) -> Option<&AnnotationBox> {
        self.boxes.get(&id)
    }

    /// All boxes, page by page (pages in key order), insertion order within a page.
    pub fn iter(&self) -> impl Iterator<Item = &AnnotationBox> {
        self.pages.values().flatten().filter_map(|id| self.boxes.get(id))
    }

    /// Boxes on one page, optionally restricted to a layer.
    #[must_use]
    pub fn list(&self, key: &PageKey, layer_id: Option<&LayerId>, order: BoxOrder) -> Vec<AnnotationBox> {
        let mut boxes: Vec<AnnotationBox> = self
            .pages
            .get(key)
            .into_iter()
            .flatten()
            .filter_map(|id| self.boxes.get(id))
            .filter(|b| layer_id.is_none_or(|layer| &b.layer_id == layer))
            .cloned()
            .collect();
        sort_boxes(&mut boxes, order);
        boxes
    }

    /// Boxes of one layer across every page, optionally restricted to a document.
    #[must_use]
    pub fn layer_boxes(&self, document_id: Option<&str>, layer_id: &LayerId, order: BoxOrder) -> Vec<AnnotationBox> {
        let mut boxes: Vec<AnnotationBox> = self
            .iter()
            .filter(|b| &b.layer_id == layer_id)
            .filter(|b| document_id.is_none_or(|doc| b.document_id == doc))
            .cloned()
            .collect();
        sort_boxes(&mut boxes, order);
        boxes
    }

    /// Number of boxes in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Returns `true` if the store contains no boxes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}
