#![allow(clippy::float_cmp)]

use super::*;
use crate::model::LayerId;
use serde_json::json;
use uuid::Uuid;

fn layer() -> Layer {
    Layer { id: LayerId::from("notes"), name: "Notes".into(), color: "#10B981".into(), visible: true }
}

fn annotation(page_number: u32, y: f64, text: &str) -> AnnotationBox {
    AnnotationBox {
        id: Uuid::new_v4(),
        document_id: "doc".into(),
        layer_id: LayerId::from("notes"),
        page_number,
        x: 10.0,
        y,
        width: 40.0,
        height: 30.0,
        text: text.into(),
        color: "#10B981".into(),
        created_at: 1,
        updated_at: 2,
    }
}

// =============================================================
// export
// =============================================================

#[test]
fn export_groups_boxes_by_ascending_page() {
    let boxes = vec![annotation(3, 0.0, "c"), annotation(1, 10.0, "a"), annotation(1, 20.0, "b")];
    let export = export_layer("report.pdf", &layer(), boxes, "2024-01-01T00:00:00Z".into());

    assert_eq!(export.document_name, "report.pdf");
    assert_eq!(export.layer.id, "notes");
    assert_eq!(export.pages.iter().map(|p| p.page_number).collect::<Vec<_>>(), vec![1, 3]);
    let first: Vec<&str> = export.pages[0].boxes.iter().map(|b| b.annotation.text.as_str()).collect();
    assert_eq!(first, vec!["a", "b"]);
    assert_eq!(export.metadata.total_pages, 2);
    assert_eq!(export.metadata.total_boxes, 3);
    assert_eq!(export.metadata.default_page_width, 800);
    assert_eq!(export.metadata.default_page_height, 1131);
}

#[test]
fn export_json_shape() {
    let export = export_layer("doc", &layer(), vec![annotation(1, 0.0, "a")], "2024-01-01T00:00:00Z".into());
    let value = serde_json::to_value(&export).unwrap();
    assert_eq!(value["documentName"], json!("doc"));
    assert_eq!(value["layer"], json!({"id": "notes", "name": "Notes", "color": "#10B981"}));
    let exported = &value["pages"][0]["boxes"][0];
    assert_eq!(exported["pageWidth"], json!(800));
    assert_eq!(exported["pageHeight"], json!(1131));
    assert_eq!(exported["layerId"], json!("notes"));
    assert_eq!(exported["pageNumber"], json!(1));
    assert_eq!(value["metadata"]["totalBoxes"], json!(1));
    assert_eq!(value["metadata"]["exportDate"], json!("2024-01-01T00:00:00Z"));
}

#[test]
fn empty_export_has_no_pages() {
    let export = export_layer("doc", &layer(), Vec::new(), String::new());
    assert!(export.pages.is_empty());
    assert_eq!(export.metadata.total_pages, 0);
}

#[test]
fn export_timestamp_is_rfc3339() {
    let stamp = export_timestamp();
    assert!(OffsetDateTime::parse(&stamp, &Rfc3339).is_ok());
}

// =============================================================
// import
// =============================================================

#[test]
fn parse_reads_exported_file() {
    let export = export_layer("doc", &layer(), vec![annotation(2, 5.0, "hello")], String::new());
    let raw = serde_json::to_string(&export).unwrap();
    let imported = parse_import(&raw).unwrap();
    assert_eq!(imported.len(), 1);
    let first = &imported[0];
    assert_eq!(first.page_number, 2);
    assert_eq!((first.x, first.y, first.width, first.height), (10.0, 5.0, 40.0, 30.0));
    assert_eq!(first.text, "hello");
    assert_eq!(first.color.as_deref(), Some("#10B981"));
}

#[test]
fn parse_tolerates_missing_and_non_array_collections() {
    assert!(parse_import("{}").unwrap().is_empty());
    assert!(parse_import(r#"{"pages": "nope"}"#).unwrap().is_empty());
    assert!(parse_import(r#"{"pages": [{"pageNumber": 1}]}"#).unwrap().is_empty());
    assert!(parse_import(r#"{"pages": [{"pageNumber": 1, "boxes": {}}]}"#).unwrap().is_empty());
}

#[test]
fn parse_defaults_text_and_color() {
    let imported = parse_import(r#"{"pages":[{"pageNumber":1,"boxes":[{"x":1,"y":2,"width":3,"height":4}]}]}"#).unwrap();
    assert_eq!(imported[0].text, "");
    assert!(imported[0].color.is_none());
}

#[test]
fn parse_rejects_syntax_errors() {
    let err = parse_import("{\"pages\": [").unwrap_err();
    assert_eq!(err.code(), "E_MALFORMED_IMPORT");
}

#[test]
fn parse_rejects_non_numeric_geometry() {
    let raw = r#"{"pages":[{"pageNumber":1,"boxes":[
        {"x":1,"y":2,"width":3,"height":4},
        {"x":"left","y":2,"width":3,"height":4}
    ]}]}"#;
    assert!(matches!(parse_import(raw), Err(AnnotationError::MalformedImport(_))));
}

#[test]
fn parse_rejects_bad_page_numbers() {
    for raw in [
        r#"{"pages":[{"boxes":[]}]}"#,
        r#"{"pages":[{"pageNumber":0,"boxes":[]}]}"#,
        r#"{"pages":[{"pageNumber":-1,"boxes":[]}]}"#,
        r#"{"pages":[{"pageNumber":"1","boxes":[]}]}"#,
    ] {
        assert!(matches!(parse_import(raw), Err(AnnotationError::MalformedImport(_))), "{raw}");
    }
}

#[test]
fn parse_rejects_non_object_root_and_boxes() {
    assert!(parse_import("[]").is_err());
    assert!(parse_import(r#"{"pages":[{"pageNumber":1,"boxes":[7]}]}"#).is_err());
}
