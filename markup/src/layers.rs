//! Layer registry: the ordered layer list, per-layer visibility, and the
//! single selected layer that receives new boxes.
//!
//! Visibility (`visible`) and selection are independent: hiding the selected
//! layer does not change the selection. The reserved `default` layer is
//! created with the registry, starts out selected, and can never be removed.
//! Operations that must also touch boxes, connections or groups (remove,
//! duplicate, merge) are orchestrated by `store::Annotations`.

#[cfg(test)]
#[path = "layers_test.rs"]
mod layers_test;

use rand::Rng;

use crate::consts::{DEFAULT_LAYER_NAME, LAYER_PALETTE};
use crate::error::AnnotationError;
use crate::model::{Layer, LayerId};

/// Random `#RRGGBB` color.
#[must_use]
pub fn random_color() -> String {
    let value: u32 = rand::rng().random_range(0..=0x00FF_FFFF);
    format!("#{value:06X}")
}

#[derive(Debug)]
pub struct LayerRegistry {
    layers: Vec<Layer>,
    selected: LayerId,
}

impl LayerRegistry {
    /// Registry holding only the default layer, which is selected.
    #[must_use]
    pub fn new() -> Self {
        let default = Layer {
            id: LayerId::default_layer(),
            name: DEFAULT_LAYER_NAME.to_owned(),
            color: LAYER_PALETTE[0].to_owned(),
            visible: true,
        };
        Self { selected: default.id.clone(), layers: vec![default] }
    }

    /// Layers in creation order; the default layer is always first.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    #[must_use]
    pub fn get(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| &l.id == id)
    }

    fn get_mut(&mut self, id: &LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| &l.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &LayerId) -> bool {
        self.get(id).is_some()
    }

    /// Whether `id` names a live, visible layer.
    #[must_use]
    pub fn is_visible(&self, id: &LayerId) -> bool {
        self.get(id).is_some_and(|l| l.visible)
    }

    /// Id of the layer currently receiving new boxes.
    #[must_use]
    pub fn selected(&self) -> &LayerId {
        &self.selected
    }

    /// Check a candidate layer name, returning it trimmed.
    ///
    /// # Errors
    ///
    /// `EmptyLayerName`, or `DuplicateLayerName` if another layer (other than
    /// `except`) already has the name. Comparison is case-sensitive.
    pub fn validate_name(&self, name: &str, except: Option<&LayerId>) -> Result<String, AnnotationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AnnotationError::EmptyLayerName);
        }
        if self.layers.iter().any(|l| l.name == name && Some(&l.id) != except) {
            return Err(AnnotationError::DuplicateLayerName(name.to_owned()));
        }
        Ok(name.to_owned())
    }

    /// First palette color no layer uses yet, or a random color once the
    /// palette is exhausted.
    #[must_use]
    pub fn next_color(&self) -> String {
        LAYER_PALETTE
            .iter()
            .find(|candidate| !self.layers.iter().any(|l| l.color.eq_ignore_ascii_case(candidate)))
            .map_or_else(random_color, |c| (*c).to_owned())
    }

    /// `"<base> copy"`, then `"<base> copy 2"`, `"<base> copy 3"`, ... until unused.
    #[must_use]
    pub fn duplicate_name(&self, base: &str) -> String {
        let first = format!("{base} copy");
        if !self.layers.iter().any(|l| l.name == first) {
            return first;
        }
        (2_usize..)
            .map(|n| format!("{base} copy {n}"))
            .find(|candidate| !self.layers.iter().any(|l| &l.name == candidate))
            .unwrap_or(first)
    }

    /// Create a visible layer at the end of the list.
    ///
    /// # Errors
    ///
    /// Name validation errors.
    pub(crate) fn add(&mut self, name: &str, color: Option<String>) -> Result<Layer, AnnotationError> {
        let name = self.validate_name(name, None)?;
        let layer = Layer {
            id: LayerId::generate(),
            name,
            color: color.unwrap_or_else(|| self.next_color()),
            visible: true,
        };
        self.layers.push(layer.clone());
        Ok(layer)
    }

    /// Rename a layer. `Ok(None)` if it does not exist.
    ///
    /// # Errors
    ///
    /// Name validation errors.
    pub(crate) fn rename(&mut self, id: &LayerId, name: &str) -> Result<Option<Layer>, AnnotationError> {
        if !self.contains(id) {
            return Ok(None);
        }
        let name = self.validate_name(name, Some(id))?;
        Ok(self.get_mut(id).map(|layer| {
            layer.name = name;
            layer.clone()
        }))
    }

    pub(crate) fn set_color(&mut self, id: &LayerId, color: String) -> Option<Layer> {
        let layer = self.get_mut(id)?;
        layer.color = color;
        Some(layer.clone())
    }

    /// Flip visibility, returning the new value.
    pub(crate) fn toggle_visibility(&mut self, id: &LayerId) -> Option<bool> {
        let layer = self.get_mut(id)?;
        layer.visible = !layer.visible;
        Some(layer.visible)
    }

    pub(crate) fn set_visibility(&mut self, id: &LayerId, visible: bool) -> Option<bool> {
        let layer = self.get_mut(id)?;
        layer.visible = visible;
        Some(visible)
    }

    /// Make `id` the layer receiving new boxes.
    ///
    /// # Errors
    ///
    /// `LayerNotFound` if no such layer exists.
    pub(crate) fn select(&mut self, id: &LayerId) -> Result<(), AnnotationError> {
        if !self.contains(id) {
            return Err(AnnotationError::LayerNotFound(id.clone()));
        }
        self.selected = id.clone();
        Ok(())
    }

    /// Drop a layer from the list and move the selection to the first
    /// remaining layer. Children must already have been cascaded.
    ///
    /// # Errors
    ///
    /// `ReservedLayer` for the default layer.
    pub(crate) fn remove(&mut self, id: &LayerId) -> Result<Option<Layer>, AnnotationError> {
        if id.is_default() {
            return Err(AnnotationError::ReservedLayer(id.clone()));
        }
        let Some(index) = self.layers.iter().position(|l| &l.id == id) else {
            return Ok(None);
        };
        let removed = self.layers.remove(index);
        if let Some(first) = self.layers.first() {
            self.selected = first.id.clone();
        }
        Ok(Some(removed))
    }
}

impl Default for LayerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
