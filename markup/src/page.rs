//! Page data assembly: everything a renderer needs for one page.
//!
//! DESIGN
//! ======
//! `PageData` is recomputed from the stores and cached per page, tagged with
//! the store revision it was built at. `Annotations` bumps the revision on
//! every mutation, so a cached entry is served only while nothing changed.

#[cfg(test)]
#[path = "page_test.rs"]
mod page_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::boxes::{BoxOrder, BoxStore};
use crate::connections::ConnectionStore;
use crate::groups::GroupStore;
use crate::layers::LayerRegistry;
use crate::model::{AnnotationBox, Connection, Group, Layer, PageKey};

/// Snapshot of one page. `layers` is the global list; the rest is filtered
/// to the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData {
    pub layers: Vec<Layer>,
    pub boxes: Vec<AnnotationBox>,
    pub connections: Vec<Connection>,
    pub group_boxes: Vec<Group>,
}

/// Build page data straight from the stores, bypassing any cache.
#[must_use]
pub fn assemble(
    key: &PageKey,
    boxes: &BoxStore,
    connections: &ConnectionStore,
    groups: &GroupStore,
    layers: &LayerRegistry,
) -> PageData {
    PageData {
        layers: layers.layers().to_vec(),
        boxes: boxes.list(key, None, BoxOrder::Insertion),
        connections: connections.for_page(key, None),
        group_boxes: groups.for_page(key, None),
    }
}

/// Per-page cache of assembled `PageData`.
#[derive(Debug, Default)]
pub struct PageDataAssembler {
    cache: HashMap<PageKey, (u64, PageData)>,
}

impl PageDataAssembler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached page data for `key` if it was built at `revision`, otherwise a
    /// fresh assembly. Entries from older revisions are evicted, and pages
    /// with no boxes are never cached.
    pub fn get(
        &mut self,
        revision: u64,
        key: &PageKey,
        boxes: &BoxStore,
        connections: &ConnectionStore,
        groups: &GroupStore,
        layers: &LayerRegistry,
    ) -> PageData {
        if let Some((built_at, data)) = self.cache.get(key) {
            if *built_at == revision {
                return data.clone();
            }
        }
        self.cache.retain(|_, (built_at, _)| *built_at == revision);
        let data = assemble(key, boxes, connections, groups, layers);
        if !data.boxes.is_empty() {
            self.cache.insert(key.clone(), (revision, data.clone()));
        }
        data
    }

    /// Whether an entry built at `revision` is cached for `key`.
    #[must_use]
    pub fn is_fresh(&self, key: &PageKey, revision: u64) -> bool {
        self.cache.get(key).is_some_and(|(built_at, _)| *built_at == revision)
    }

    /// Drop every cached page.
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}
