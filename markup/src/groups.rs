//! Group store: named box sets on one page and layer, with a bounding envelope.
//!
//! Bounds are computed when a group is created or its members are replaced,
//! and on an explicit refresh. Moving a member afterwards leaves the stored
//! bounds stale until then.

#[cfg(test)]
#[path = "groups_test.rs"]
mod groups_test;

use std::collections::HashMap;

use uuid::Uuid;

use crate::boxes::BoxStore;
use crate::error::AnnotationError;
use crate::geometry::Rect;
use crate::layers::random_color;
use crate::model::{BoxId, Group, GroupId, GroupPatch, LayerId, PageKey, now_ms};

/// Drop repeated ids, keeping first-seen order.
fn dedup_ids(ids: &[BoxId]) -> Vec<BoxId> {
    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(*id);
        }
    }
    unique
}

/// Validate a member list for `(key, layer_id)` and compute its envelope.
///
/// # Errors
///
/// `TooFewGroupMembers`, `BoxNotFound`, or `GroupMemberOutsidePartition`.
pub fn member_bounds(
    boxes: &BoxStore,
    ids: &[BoxId],
    key: &PageKey,
    layer_id: &LayerId,
) -> Result<(Vec<BoxId>, Rect), AnnotationError> {
    let ids = dedup_ids(ids);
    if ids.len() < 2 {
        return Err(AnnotationError::TooFewGroupMembers(ids.len()));
    }
    let mut rects = Vec::with_capacity(ids.len());
    for id in &ids {
        let member = boxes.get(*id).ok_or(AnnotationError::BoxNotFound(*id))?;
        if member.page_key() != *key || &member.layer_id != layer_id {
            return Err(AnnotationError::GroupMemberOutsidePartition(*id));
        }
        rects.push(member.rect());
    }
    let bounds = Rect::envelope(rects).ok_or(AnnotationError::TooFewGroupMembers(0))?;
    Ok((ids, bounds))
}

/// Arena of groups, kept in creation order.
#[derive(Debug, Default)]
pub struct GroupStore {
    groups: HashMap<GroupId, Group>,
    order: Vec<GroupId>,
}

impl GroupStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a group from at least two boxes on `key` / `layer_id`.
    ///
    /// # Errors
    ///
    /// Member validation errors; nothing is stored on error.
    pub(crate) fn create(
        &mut self,
        boxes: &BoxStore,
        box_ids: &[BoxId],
        name: &str,
        layer_id: LayerId,
        key: &PageKey,
    ) -> Result<Group, AnnotationError> {
        let (box_ids, bounds) = member_bounds(boxes, box_ids, key, &layer_id)?;
        let group = Group {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            document_id: key.document_id.clone(),
            layer_id,
            page_number: key.page_number,
            box_ids,
            bounds,
            color: random_color(),
            created_at: now_ms(),
        };
        self.order.push(group.id);
        self.groups.insert(group.id, group.clone());
        Ok(group)
    }

    /// Apply a sparse update. A new member list is validated and the bounds
    /// recomputed before anything changes.
    ///
    /// # Errors
    ///
    /// Member validation errors; the group is left untouched.
    pub(crate) fn update(
        &mut self,
        boxes: &BoxStore,
        id: GroupId,
        patch: &GroupPatch,
    ) -> Result<Option<Group>, AnnotationError> {
        let Some(group) = self.groups.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(ref ids) = patch.box_ids {
            let key = PageKey::new(group.document_id.clone(), group.page_number);
            let (box_ids, bounds) = member_bounds(boxes, ids, &key, &group.layer_id)?;
            group.box_ids = box_ids;
            group.bounds = bounds;
        }
        if let Some(ref name) = patch.name {
            group.name.clone_from(name);
        }
        if let Some(ref color) = patch.color {
            group.color.clone_from(color);
        }
        Ok(Some(group.clone()))
    }

    /// Recompute bounds from the members' current geometry.
    pub(crate) fn refresh_bounds(&mut self, boxes: &BoxStore, id: GroupId) -> Option<Group> {
        let group = self.groups.get_mut(&id)?;
        let rects = group.box_ids.iter().filter_map(|member| boxes.get(*member)).map(|b| b.rect());
        if let Some(bounds) = Rect::envelope(rects) {
            group.bounds = bounds;
        }
        Some(group.clone())
    }

    /// Remove a group, returning it if it was present. Members are untouched.
    pub(crate) fn remove(&mut self, id: GroupId) -> Option<Group> {
        let removed = self.groups.remove(&id)?;
        self.order.retain(|candidate| *candidate != id);
        Some(removed)
    }

    /// Drop `box_id` from every group. Groups left with fewer than two
    /// members are dissolved and returned.
    pub(crate) fn remove_member(&mut self, box_id: BoxId) -> Vec<Group> {
        let mut dissolved = Vec::new();
        for group in self.groups.values_mut() {
            group.box_ids.retain(|member| *member != box_id);
            if group.box_ids.len() < 2 {
                dissolved.push(group.id);
            }
        }
        dissolved.into_iter().filter_map(|id| self.remove(id)).collect()
    }

    /// Remove every group on `layer_id`.
    pub(crate) fn remove_layer(&mut self, layer_id: &LayerId) -> Vec<Group> {
        let ids: Vec<GroupId> = self.iter().filter(|g| &g.layer_id == layer_id).map(|g| g.id).collect();
        ids.into_iter().filter_map(|id| self.remove(id)).collect()
    }

    /// Move every group on `from` to `to`. Returns how many moved.
    pub(crate) fn reassign_layer(&mut self, from: &LayerId, to: &LayerId) -> usize {
        let mut moved = 0;
        for group in self.groups.values_mut().filter(|g| &g.layer_id == from) {
            group.layer_id = to.clone();
            moved += 1;
        }
        moved
    }

    #[must_use]
    pub fn get(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(&id)
    }

    /// All groups in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.order.iter().filter_map(|id| self.groups.get(id))
    }

    /// Groups on one page, optionally restricted to a layer.
    #[must_use]
    pub fn for_page(&self, key: &PageKey, layer_id: Option<&LayerId>) -> Vec<Group> {
        self.iter()
            .filter(|g| g.page_number == key.page_number && g.document_id == key.document_id)
            .filter(|g| layer_id.is_none_or(|layer| &g.layer_id == layer))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
