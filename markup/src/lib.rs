//! Annotation state engine and connector geometry for marking up paged
//! documents.
//!
//! Boxes, connections between boxes, and box groups are laid over the pages
//! of a document and organized into toggleable layers. This crate keeps them
//! consistent across (document, page, layer) as layers are duplicated,
//! merged or removed, and computes where connector lines meet box edges.
//! It does no I/O: rendering, page rasterization and region capture belong
//! to the host.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`store`] | [`store::Annotations`], the façade every mutation goes through |
//! | [`boxes`] | Box arena with per-page insertion order and size clamping |
//! | [`connections`] | Connections between two boxes on one page |
//! | [`groups`] | Named box sets with a bounding envelope |
//! | [`layers`] | Layer list, palette colors, visibility and selection |
//! | [`page`] | Per-page data assembly with a revision-keyed cache |
//! | [`geometry`] | Box-edge intersection, control points, line distance |
//! | [`hit`] | Topmost box / nearest connector under a page point |
//! | [`transfer`] | Layer export/import file format |
//! | [`capture`] | Region-capture request body for a box |
//! | [`model`] | Entity and patch types |
//! | [`error`] | [`error::AnnotationError`] |
//! | [`consts`] | Shared constants (minimum box size, palette, page size, etc.) |

pub mod boxes;
pub mod capture;
pub mod connections;
pub mod consts;
pub mod error;
pub mod geometry;
pub mod groups;
pub mod hit;
pub mod layers;
pub mod model;
pub mod page;
pub mod store;
pub mod transfer;

pub use error::AnnotationError;
pub use store::Annotations;
