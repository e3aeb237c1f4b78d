//! Error type shared by every mutating operation of the engine.
//!
//! Operations that reference an id which is already gone are not errors:
//! they return `None` and leave state untouched. Everything here is a
//! rejected request, and a rejected request never leaves a partial mutation
//! behind.

use crate::model::{BoxId, LayerId};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnnotationError {
    #[error("a layer named {0:?} already exists")]
    DuplicateLayerName(String),
    #[error("layer name must not be empty")]
    EmptyLayerName,
    #[error("layer {0} is reserved and cannot be removed")]
    ReservedLayer(LayerId),
    #[error("layer not found: {0}")]
    LayerNotFound(LayerId),
    #[error("box not found: {0}")]
    BoxNotFound(BoxId),
    #[error("box {0} cannot be connected to itself")]
    SelfConnection(BoxId),
    #[error("boxes {start} and {end} are on different pages")]
    CrossPageConnection { start: BoxId, end: BoxId },
    #[error("a group needs at least 2 boxes, got {0}")]
    TooFewGroupMembers(usize),
    #[error("box {0} is not on the group's page and layer")]
    GroupMemberOutsidePartition(BoxId),
    #[error("layer {0} cannot be merged into itself")]
    MergeIntoSelf(LayerId),
    #[error("malformed import: {0}")]
    MalformedImport(String),
}

impl AnnotationError {
    /// Grepable code for structured error responses.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateLayerName(_) => "E_DUPLICATE_LAYER_NAME",
            Self::EmptyLayerName => "E_EMPTY_LAYER_NAME",
            Self::ReservedLayer(_) => "E_RESERVED_LAYER",
            Self::LayerNotFound(_) => "E_LAYER_NOT_FOUND",
            Self::BoxNotFound(_) => "E_BOX_NOT_FOUND",
            Self::SelfConnection(_) => "E_SELF_CONNECTION",
            Self::CrossPageConnection { .. } => "E_CROSS_PAGE_CONNECTION",
            Self::TooFewGroupMembers(_) => "E_TOO_FEW_GROUP_MEMBERS",
            Self::GroupMemberOutsidePartition(_) => "E_GROUP_MEMBER_OUTSIDE_PARTITION",
            Self::MergeIntoSelf(_) => "E_MERGE_INTO_SELF",
            Self::MalformedImport(_) => "E_MALFORMED_IMPORT",
        }
    }

    /// True when the error names an entity that does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::LayerNotFound(_) | Self::BoxNotFound(_))
    }
}
