//! Annotation engine façade.
//!
//! DESIGN
//! ======
//! `Annotations` owns every store and the layer registry. All mutations go
//! through it so that cross-store rules hold after every call:
//!
//! - boxes, connections and groups only ever reference live layers;
//! - deleting a box deletes its connections and drops it from groups;
//! - removing, merging or duplicating a layer touches every store at once.
//!
//! Each successful mutation bumps `revision`, which invalidates the page
//! data cache. Validation happens before the first write, so a rejected
//! call leaves every store as it was.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use crate::boxes::{BoxOrder, BoxStore};
use crate::connections::ConnectionStore;
use crate::error::AnnotationError;
use crate::geometry::{ConnectorPath, Rect, connector_path};
use crate::groups::GroupStore;
use crate::layers::LayerRegistry;
use crate::model::{
    AnnotationBox, BoxId, BoxPatch, Connection, ConnectionId, ConnectionPatch, ConnectionStyle, Group, GroupId,
    GroupPatch, Layer, LayerId, PageKey,
};
use crate::page::{PageData, PageDataAssembler};
use crate::transfer::{self, ImportSummary, LayerExport};

#[derive(Debug, Default)]
pub struct Annotations {
    boxes: BoxStore,
    connections: ConnectionStore,
    groups: GroupStore,
    layers: LayerRegistry,
    pages: PageDataAssembler,
    revision: u64,
}

impl Annotations {
    /// Empty engine with only the default layer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn live_layer(&self, id: &LayerId) -> Result<&Layer, AnnotationError> {
        self.layers.get(id).ok_or_else(|| AnnotationError::LayerNotFound(id.clone()))
    }

    /// Counter bumped by every mutation.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn boxes(&self) -> &BoxStore {
        &self.boxes
    }

    #[must_use]
    pub fn connections(&self) -> &ConnectionStore {
        &self.connections
    }

    #[must_use]
    pub fn groups(&self) -> &GroupStore {
        &self.groups
    }

    #[must_use]
    pub fn layers(&self) -> &LayerRegistry {
        &self.layers
    }

    // =========================================================================
    // PAGES
    // =========================================================================

    /// Layers, boxes, connections and groups for one page. The page is
    /// initialized if it has never been seen.
    pub fn page_data(&mut self, key: &PageKey) -> PageData {
        self.boxes.ensure_page(key);
        self.pages.get(self.revision, key, &self.boxes, &self.connections, &self.groups, &self.layers)
    }

    // =========================================================================
    // BOXES
    // =========================================================================

    /// Draw a box on `key`. The layer defaults to the selected layer and the
    /// color to the layer's color.
    ///
    /// # Errors
    ///
    /// `LayerNotFound` if `layer_id` names no live layer.
    pub fn add_box(
        &mut self,
        key: &PageKey,
        layer_id: Option<LayerId>,
        rect: Rect,
        text: String,
        color: Option<String>,
    ) -> Result<AnnotationBox, AnnotationError> {
        let layer_id = layer_id.unwrap_or_else(|| self.layers.selected().clone());
        let layer_color = &self.live_layer(&layer_id)?.color;
        let color = color.unwrap_or_else(|| layer_color.clone());

        let annotation = self.boxes.insert(key, layer_id, rect, text, color);
        self.touch();
        tracing::debug!(box_id = %annotation.id, document = %key.document_id, page = key.page_number, "box added");
        Ok(annotation)
    }

    /// Apply a sparse update. `Ok(None)` if the box does not exist. Moving a
    /// box to another layer also takes it out of its groups.
    ///
    /// # Errors
    ///
    /// `LayerNotFound` if the patch names a dead layer.
    pub fn update_box(&mut self, id: BoxId, patch: &BoxPatch) -> Result<Option<AnnotationBox>, AnnotationError> {
        let Some(current_layer) = self.boxes.get(id).map(|b| b.layer_id.clone()) else {
            return Ok(None);
        };
        if let Some(ref layer_id) = patch.layer_id {
            self.live_layer(layer_id)?;
        }

        let updated = self.boxes.update(id, patch);
        if patch.layer_id.as_ref().is_some_and(|layer| *layer != current_layer) {
            let dissolved = self.groups.remove_member(id);
            tracing::debug!(box_id = %id, dissolved = dissolved.len(), "box moved to another layer");
        }
        self.touch();
        Ok(updated)
    }

    /// Delete a box with its connections, dropping it from every group.
    /// Returns `None` if it was already gone.
    pub fn remove_box(&mut self, id: BoxId) -> Option<AnnotationBox> {
        let removed = self.boxes.remove(id)?;
        let connections = self.connections.remove_for_box(id);
        let dissolved = self.groups.remove_member(id);
        self.touch();
        if !connections.is_empty() || !dissolved.is_empty() {
            tracing::info!(
                box_id = %id,
                connections = connections.len(),
                dissolved_groups = dissolved.len(),
                "box removed with dependents"
            );
        }
        Some(removed)
    }

    /// Boxes on a page, initializing the page if needed.
    pub fn list_boxes(&mut self, key: &PageKey, layer_id: Option<&LayerId>, order: BoxOrder) -> Vec<AnnotationBox> {
        self.boxes.ensure_page(key);
        self.boxes.list(key, layer_id, order)
    }

    #[must_use]
    pub fn get_box(&self, id: BoxId) -> Option<&AnnotationBox> {
        self.boxes.get(id)
    }

    // =========================================================================
    // CONNECTIONS
    // =========================================================================

    /// Connect two boxes on the same page. The layer defaults to the
    /// selected layer and the style to `ConnectionStyle::default()`.
    ///
    /// # Errors
    ///
    /// `SelfConnection`, `BoxNotFound`, `CrossPageConnection` or
    /// `LayerNotFound`.
    pub fn add_connection(
        &mut self,
        start: BoxId,
        end: BoxId,
        layer_id: Option<LayerId>,
        style: Option<ConnectionStyle>,
    ) -> Result<Connection, AnnotationError> {
        let layer_id = layer_id.unwrap_or_else(|| self.layers.selected().clone());
        crate::connections::validate_endpoints(&self.boxes, start, end)?;
        self.live_layer(&layer_id)?;

        let connection = self.connections.create(&self.boxes, start, end, layer_id, style.unwrap_or_default())?;
        self.touch();
        tracing::debug!(connection_id = %connection.id, %start, %end, "connection added");
        Ok(connection)
    }

    /// Update style and/or endpoints. `Ok(None)` if the connection is gone.
    ///
    /// # Errors
    ///
    /// Endpoint validation errors when the patch changes an endpoint.
    pub fn update_connection(
        &mut self,
        id: ConnectionId,
        patch: &ConnectionPatch,
    ) -> Result<Option<Connection>, AnnotationError> {
        let updated = self.connections.update(&self.boxes, id, patch)?;
        if updated.is_some() {
            self.touch();
        }
        Ok(updated)
    }

    pub fn remove_connection(&mut self, id: ConnectionId) -> Option<Connection> {
        let removed = self.connections.remove(id)?;
        self.touch();
        Some(removed)
    }

    #[must_use]
    pub fn connections_for_box(&self, box_id: BoxId) -> Vec<Connection> {
        self.connections.for_box(box_id)
    }

    #[must_use]
    pub fn connections_for_page(&self, key: &PageKey, layer_id: Option<&LayerId>) -> Vec<Connection> {
        self.connections.for_page(key, layer_id)
    }

    /// Connector geometry for a connection, from its boxes' current rects.
    #[must_use]
    pub fn connection_path(&self, id: ConnectionId) -> Option<ConnectorPath> {
        let connection = self.connections.get(id)?;
        let start = self.boxes.get(connection.start_box_id)?;
        let end = self.boxes.get(connection.end_box_id)?;
        Some(connector_path(&start.rect(), &end.rect()))
    }

    // =========================================================================
    // GROUPS
    // =========================================================================

    /// Group boxes on `key`. The layer defaults to the selected layer.
    ///
    /// # Errors
    ///
    /// `LayerNotFound` or any member validation error.
    pub fn create_group(
        &mut self,
        key: &PageKey,
        box_ids: &[BoxId],
        name: &str,
        layer_id: Option<LayerId>,
    ) -> Result<Group, AnnotationError> {
        let layer_id = layer_id.unwrap_or_else(|| self.layers.selected().clone());
        self.live_layer(&layer_id)?;
        let group = self.groups.create(&self.boxes, box_ids, name, layer_id, key)?;
        self.touch();
        tracing::debug!(group_id = %group.id, members = group.box_ids.len(), "group created");
        Ok(group)
    }

    /// # Errors
    ///
    /// Member validation errors when the patch replaces the member list.
    pub fn update_group(&mut self, id: GroupId, patch: &GroupPatch) -> Result<Option<Group>, AnnotationError> {
        let updated = self.groups.update(&self.boxes, id, patch)?;
        if updated.is_some() {
            self.touch();
        }
        Ok(updated)
    }

    /// Recompute a group's bounds from its members' current geometry.
    pub fn refresh_group_bounds(&mut self, id: GroupId) -> Option<Group> {
        let refreshed = self.groups.refresh_bounds(&self.boxes, id)?;
        self.touch();
        Some(refreshed)
    }

    /// Delete a group. Member boxes are kept.
    pub fn remove_group(&mut self, id: GroupId) -> Option<Group> {
        let removed = self.groups.remove(id)?;
        self.touch();
        Some(removed)
    }

    #[must_use]
    pub fn groups_for_page(&self, key: &PageKey, layer_id: Option<&LayerId>) -> Vec<Group> {
        self.groups.for_page(key, layer_id)
    }

    // =========================================================================
    // LAYERS
    // =========================================================================

    /// # Errors
    ///
    /// `EmptyLayerName` or `DuplicateLayerName`.
    pub fn add_layer(&mut self, name: &str, color: Option<String>) -> Result<Layer, AnnotationError> {
        let layer = self.layers.add(name, color)?;
        self.touch();
        tracing::debug!(layer_id = %layer.id, name = %layer.name, "layer added");
        Ok(layer)
    }

    /// # Errors
    ///
    /// `EmptyLayerName` or `DuplicateLayerName`.
    pub fn rename_layer(&mut self, id: &LayerId, name: &str) -> Result<Option<Layer>, AnnotationError> {
        let renamed = self.layers.rename(id, name)?;
        if renamed.is_some() {
            self.touch();
        }
        Ok(renamed)
    }

    pub fn set_layer_color(&mut self, id: &LayerId, color: String) -> Option<Layer> {
        let layer = self.layers.set_color(id, color)?;
        self.touch();
        Some(layer)
    }

    pub fn toggle_visibility(&mut self, id: &LayerId) -> Option<bool> {
        let visible = self.layers.toggle_visibility(id)?;
        self.touch();
        Some(visible)
    }

    pub fn set_visibility(&mut self, id: &LayerId, visible: bool) -> Option<bool> {
        let visible = self.layers.set_visibility(id, visible)?;
        self.touch();
        Some(visible)
    }

    /// # Errors
    ///
    /// `LayerNotFound` if no such layer exists.
    pub fn select_layer(&mut self, id: &LayerId) -> Result<(), AnnotationError> {
        self.layers.select(id)?;
        self.touch();
        Ok(())
    }

    #[must_use]
    pub fn selected_layer(&self) -> &LayerId {
        self.layers.selected()
    }

    /// Delete a layer with every box, connection and group on it, across all
    /// documents and pages. The selection moves to the first remaining layer.
    /// `Ok(None)` if the layer does not exist.
    ///
    /// # Errors
    ///
    /// `ReservedLayer` for the default layer.
    pub fn remove_layer(&mut self, id: &LayerId) -> Result<Option<Layer>, AnnotationError> {
        if id.is_default() {
            return Err(AnnotationError::ReservedLayer(id.clone()));
        }
        if !self.layers.contains(id) {
            return Ok(None);
        }

        let boxes = self.boxes.remove_layer(id);
        let mut connections = self.connections.remove_layer(id);
        let mut groups = self.groups.remove_layer(id);
        for removed in &boxes {
            connections.extend(self.connections.remove_for_box(removed.id));
            groups.extend(self.groups.remove_member(removed.id));
        }
        let removed = self.layers.remove(id)?;
        self.touch();

        tracing::info!(
            layer_id = %id,
            boxes = boxes.len(),
            connections = connections.len(),
            groups = groups.len(),
            "layer removed"
        );
        Ok(removed)
    }

    /// Copy a layer and all of its boxes under a fresh `"<name> copy"` name.
    /// Connections and groups are not copied.
    ///
    /// # Errors
    ///
    /// `LayerNotFound` if the source layer does not exist.
    pub fn duplicate_layer(&mut self, id: &LayerId) -> Result<Layer, AnnotationError> {
        let source_name = self.live_layer(id)?.name.clone();
        let name = self.layers.duplicate_name(&source_name);
        let layer = self.layers.add(&name, None)?;

        let originals = self.boxes.layer_boxes(None, id, BoxOrder::Insertion);
        for original in &originals {
            self.boxes.insert(
                &original.page_key(),
                layer.id.clone(),
                original.rect(),
                original.text.clone(),
                original.color.clone(),
            );
        }
        self.touch();

        tracing::info!(source = %id, layer_id = %layer.id, boxes = originals.len(), "layer duplicated");
        Ok(layer)
    }

    /// Move every box, connection and group from `source` to `target`, then
    /// delete `source`. If `source` was selected, `target` becomes selected;
    /// otherwise the selection is kept.
    ///
    /// # Errors
    ///
    /// `MergeIntoSelf`, `ReservedLayer` when `source` is the default layer,
    /// or `LayerNotFound` for either side.
    pub fn merge_layers(&mut self, source: &LayerId, target: &LayerId) -> Result<Layer, AnnotationError> {
        if source == target {
            return Err(AnnotationError::MergeIntoSelf(source.clone()));
        }
        if source.is_default() {
            return Err(AnnotationError::ReservedLayer(source.clone()));
        }
        self.live_layer(source)?;
        let merged_into = self.live_layer(target)?.clone();

        let boxes = self.boxes.reassign_layer(source, target);
        let connections = self.connections.reassign_layer(source, target);
        let groups = self.groups.reassign_layer(source, target);

        let selection = if self.layers.selected() == source { target.clone() } else { self.layers.selected().clone() };
        self.layers.remove(source)?;
        self.layers.select(&selection)?;
        self.touch();

        tracing::info!(%source, %target, boxes, connections, groups, "layers merged");
        Ok(merged_into)
    }

    // =========================================================================
    // TRANSFER
    // =========================================================================

    /// Export one layer of one document, boxes in position order.
    ///
    /// # Errors
    ///
    /// `LayerNotFound` if the layer does not exist.
    pub fn export_layer(
        &self,
        document_id: &str,
        layer_id: &LayerId,
        document_name: &str,
    ) -> Result<LayerExport, AnnotationError> {
        let layer = self.live_layer(layer_id)?;
        let boxes = self.boxes.layer_boxes(Some(document_id), layer_id, BoxOrder::Position);
        Ok(transfer::export_layer(document_name, layer, boxes, transfer::export_timestamp()))
    }

    /// Import an export file into `layer_id` on `document_id`. The payload is
    /// parsed in full before any box is added.
    ///
    /// # Errors
    ///
    /// `LayerNotFound`, or `MalformedImport` with nothing applied.
    pub fn import_layer(
        &mut self,
        document_id: &str,
        layer_id: &LayerId,
        raw: &str,
    ) -> Result<ImportSummary, AnnotationError> {
        let layer_color = self.live_layer(layer_id)?.color.clone();
        let imported = match transfer::parse_import(raw) {
            Ok(imported) => imported,
            Err(err) => {
                tracing::warn!(document = %document_id, layer_id = %layer_id, error = %err, "import rejected");
                return Err(err);
            }
        };

        let mut pages: Vec<u32> = imported.iter().map(|b| b.page_number).collect();
        pages.sort_unstable();
        pages.dedup();

        for entry in &imported {
            let key = PageKey::new(document_id, entry.page_number);
            self.boxes.insert(
                &key,
                layer_id.clone(),
                Rect::new(entry.x, entry.y, entry.width, entry.height),
                entry.text.clone(),
                entry.color.clone().unwrap_or_else(|| layer_color.clone()),
            );
        }
        self.touch();

        let summary = ImportSummary { pages: pages.len(), boxes: imported.len() };
        tracing::info!(document = %document_id, layer_id = %layer_id, pages = summary.pages, boxes = summary.boxes, "layer imported");
        Ok(summary)
    }
}
