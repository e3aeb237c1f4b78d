//! Connection store: edges between two boxes on the same page.
//!
//! Endpoints are validated against the [`BoxStore`] whenever they are set,
//! so a stored connection always joins two distinct boxes sharing a page.
//! Cascades (box or layer removal) are driven by `store::Annotations`.

#[cfg(test)]
#[path = "connections_test.rs"]
mod connections_test;

use std::collections::HashMap;

use uuid::Uuid;

use crate::boxes::BoxStore;
use crate::error::AnnotationError;
use crate::model::{BoxId, Connection, ConnectionId, ConnectionPatch, ConnectionStyle, LayerId, PageKey};

/// Check that `start` and `end` name two distinct existing boxes on one page,
/// and return that page.
///
/// # Errors
///
/// `SelfConnection`, `BoxNotFound`, or `CrossPageConnection`.
pub fn validate_endpoints(boxes: &BoxStore, start: BoxId, end: BoxId) -> Result<PageKey, AnnotationError> {
    if start == end {
        return Err(AnnotationError::SelfConnection(start));
    }
    let start_box = boxes.get(start).ok_or(AnnotationError::BoxNotFound(start))?;
    let end_box = boxes.get(end).ok_or(AnnotationError::BoxNotFound(end))?;
    if start_box.page_key() != end_box.page_key() {
        return Err(AnnotationError::CrossPageConnection { start, end });
    }
    Ok(start_box.page_key())
}

/// Arena of connections, kept in creation order.
#[derive(Debug, Default)]
pub struct ConnectionStore {
    connections: HashMap<ConnectionId, Connection>,
    order: Vec<ConnectionId>,
}

impl ConnectionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a connection between two boxes.
    ///
    /// # Errors
    ///
    /// Any endpoint validation error; nothing is stored on error.
    pub(crate) fn create(
        &mut self,
        boxes: &BoxStore,
        start: BoxId,
        end: BoxId,
        layer_id: LayerId,
        style: ConnectionStyle,
    ) -> Result<Connection, AnnotationError> {
        let key = validate_endpoints(boxes, start, end)?;
        let conn = Connection {
            id: Uuid::new_v4(),
            document_id: key.document_id,
            page_number: key.page_number,
            start_box_id: start,
            end_box_id: end,
            layer_id,
            style,
        };
        self.order.push(conn.id);
        self.connections.insert(conn.id, conn.clone());
        Ok(conn)
    }

    /// Apply a sparse update. Changed endpoints are re-validated first.
    ///
    /// # Errors
    ///
    /// Endpoint validation errors; the connection is left untouched.
    pub(crate) fn update(
        &mut self,
        boxes: &BoxStore,
        id: ConnectionId,
        patch: &ConnectionPatch,
    ) -> Result<Option<Connection>, AnnotationError> {
        let Some(conn) = self.connections.get_mut(&id) else {
            return Ok(None);
        };
        if patch.start_box_id.is_some() || patch.end_box_id.is_some() {
            let start = patch.start_box_id.unwrap_or(conn.start_box_id);
            let end = patch.end_box_id.unwrap_or(conn.end_box_id);
            let key = validate_endpoints(boxes, start, end)?;
            conn.document_id = key.document_id;
            conn.page_number = key.page_number;
        }
        patch.apply_to(conn);
        Ok(Some(conn.clone()))
    }

    /// Remove a connection, returning it if it was present.
    pub(crate) fn remove(&mut self, id: ConnectionId) -> Option<Connection> {
        let removed = self.connections.remove(&id)?;
        self.order.retain(|candidate| *candidate != id);
        Some(removed)
    }

    fn remove_where(&mut self, pred: impl Fn(&Connection) -> bool) -> Vec<Connection> {
        let ids: Vec<ConnectionId> = self.iter().filter(|c| pred(c)).map(|c| c.id).collect();
        ids.into_iter().filter_map(|id| self.remove(id)).collect()
    }

    /// Remove every connection touching `box_id`.
    pub(crate) fn remove_for_box(&mut self, box_id: BoxId) -> Vec<Connection> {
        self.remove_where(|c| c.touches(box_id))
    }

    /// Remove every connection on `layer_id`.
    pub(crate) fn remove_layer(&mut self, layer_id: &LayerId) -> Vec<Connection> {
        self.remove_where(|c| &c.layer_id == layer_id)
    }

    /// Move every connection on `from` to `to`. Returns how many moved.
    pub(crate) fn reassign_layer(&mut self, from: &LayerId, to: &LayerId) -> usize {
        let mut moved = 0;
        for conn in self.connections.values_mut().filter(|c| &c.layer_id == from) {
            conn.layer_id = to.clone();
            moved += 1;
        }
        moved
    }

    /// Return a reference to a connection by id.
    #[must_use]
    pub fn get(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    /// All connections in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.order.iter().filter_map(|id| self.connections.get(id))
    }

    /// Connections with `box_id` at either end.
    #[must_use]
    pub fn for_box(&self, box_id: BoxId) -> Vec<Connection> {
        self.iter().filter(|c| c.touches(box_id)).cloned().collect()
    }

    /// Connections on one page, optionally restricted to a layer.
    #[must_use]
    pub fn for_page(&self, key: &PageKey, layer_id: Option<&LayerId>) -> Vec<Connection> {
        self.iter()
            .filter(|c| c.page_number == key.page_number && c.document_id == key.document_id)
            .filter(|c| layer_id.is_none_or(|layer| &c.layer_id == layer))
            .cloned()
            .collect()
    }

    /// Number of connections in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Returns `true` if the store contains no connections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
