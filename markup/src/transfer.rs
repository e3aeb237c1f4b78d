//! Layer export/import file format.
//!
//! DESIGN
//! ======
//! Export is a pure function of one layer and its boxes. Import is split in
//! two: `parse_import` validates the whole payload up front and yields plain
//! `ImportedBox` values, and `store::Annotations::import_layer` applies them.
//! A payload that fails parsing therefore never touches the stores.
//!
//! Parsing goes through `serde_json::Value` rather than typed structs so that
//! missing or non-array `pages`/`boxes` can be read as empty while numeric
//! fields stay strict.

#[cfg(test)]
#[path = "transfer_test.rs"]
mod transfer_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::consts::{DEFAULT_PAGE_HEIGHT, DEFAULT_PAGE_WIDTH};
use crate::error::AnnotationError;
use crate::model::{AnnotationBox, Layer};

// =============================================================================
// EXPORT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedLayer {
    pub id: String,
    pub name: String,
    pub color: String,
}

/// A box as written to an export file: every box field plus the page size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedBox {
    #[serde(flatten)]
    pub annotation: AnnotationBox,
    pub page_width: u32,
    pub page_height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedPage {
    pub page_number: u32,
    pub boxes: Vec<ExportedBox>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub total_pages: usize,
    pub total_boxes: usize,
    pub export_date: String,
    pub default_page_width: u32,
    pub default_page_height: u32,
}

/// One layer of one document, ready to be written as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerExport {
    pub document_name: String,
    pub layer: ExportedLayer,
    pub pages: Vec<ExportedPage>,
    pub metadata: ExportMetadata,
}

/// Current UTC time as RFC 3339.
#[must_use]
pub fn export_timestamp() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default()
}

/// Build the export for `layer`. `boxes` should already be in the order they
/// are to appear within each page; pages are emitted by ascending number and
/// only pages holding at least one box are written.
#[must_use]
pub fn export_layer(document_name: &str, layer: &Layer, boxes: Vec<AnnotationBox>, export_date: String) -> LayerExport {
    let total_boxes = boxes.len();
    let mut by_page: BTreeMap<u32, Vec<ExportedBox>> = BTreeMap::new();
    for annotation in boxes {
        by_page.entry(annotation.page_number).or_default().push(ExportedBox {
            annotation,
            page_width: DEFAULT_PAGE_WIDTH,
            page_height: DEFAULT_PAGE_HEIGHT,
        });
    }
    let pages: Vec<ExportedPage> =
        by_page.into_iter().map(|(page_number, boxes)| ExportedPage { page_number, boxes }).collect();

    LayerExport {
        document_name: document_name.to_owned(),
        layer: ExportedLayer { id: layer.id.to_string(), name: layer.name.clone(), color: layer.color.clone() },
        metadata: ExportMetadata {
            total_pages: pages.len(),
            total_boxes,
            export_date,
            default_page_width: DEFAULT_PAGE_WIDTH,
            default_page_height: DEFAULT_PAGE_HEIGHT,
        },
        pages,
    }
}

// =============================================================================
// IMPORT
// =============================================================================

/// A box read from an import payload, not yet bound to any layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedBox {
    pub page_number: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub text: String,
    pub color: Option<String>,
}

/// What an import applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub pages: usize,
    pub boxes: usize,
}

fn malformed(message: impl Into<String>) -> AnnotationError {
    AnnotationError::MalformedImport(message.into())
}

fn array_field<'a>(value: &'a Value, field: &str) -> &'a [Value] {
    value.get(field).and_then(Value::as_array).map_or(&[], Vec::as_slice)
}

fn page_number(page: &Value, index: usize) -> Result<u32, AnnotationError> {
    let raw = page
        .get("pageNumber")
        .and_then(Value::as_u64)
        .filter(|n| *n > 0)
        .ok_or_else(|| malformed(format!("pages[{index}].pageNumber must be a positive integer")))?;
    u32::try_from(raw).map_err(|_| malformed(format!("pages[{index}].pageNumber is out of range")))
}

fn number(entry: &Value, field: &str, page: usize, index: usize) -> Result<f64, AnnotationError> {
    entry
        .get(field)
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite())
        .ok_or_else(|| malformed(format!("pages[{page}].boxes[{index}].{field} must be a number")))
}

/// Parse an export file. Missing or non-array `pages`/`boxes` are empty.
///
/// # Errors
///
/// `MalformedImport` for invalid JSON, a non-object root, a page without a
/// positive integer `pageNumber`, or a box whose geometry is not numeric.
pub fn parse_import(raw: &str) -> Result<Vec<ImportedBox>, AnnotationError> {
    let root: Value = serde_json::from_str(raw).map_err(|e| malformed(e.to_string()))?;
    if !root.is_object() {
        return Err(malformed("expected a JSON object"));
    }

    let mut imported = Vec::new();
    for (page_index, page) in array_field(&root, "pages").iter().enumerate() {
        let page_number = page_number(page, page_index)?;
        for (box_index, entry) in array_field(page, "boxes").iter().enumerate() {
            if !entry.is_object() {
                return Err(malformed(format!("pages[{page_index}].boxes[{box_index}] must be an object")));
            }
            imported.push(ImportedBox {
                page_number,
                x: number(entry, "x", page_index, box_index)?,
                y: number(entry, "y", page_index, box_index)?,
                width: number(entry, "width", page_index, box_index)?,
                height: number(entry, "height", page_index, box_index)?,
                text: entry.get("text").and_then(Value::as_str).unwrap_or_default().to_owned(),
                color: entry.get("color").and_then(Value::as_str).map(str::to_owned),
            });
        }
    }
    Ok(imported)
}
