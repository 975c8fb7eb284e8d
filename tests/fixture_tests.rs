//! Workbooks saved by other tools, checked in under tests/fixtures

use client_filter::models::{Cell, UploadedFile};
use client_filter::services::pipeline;

const SHARED_STRINGS_XLSX: &[u8] = include_bytes!("fixtures/cartera_shared_strings.xlsx");
const LEGACY_XLS: &[u8] = include_bytes!("fixtures/cartera_legacy.xls");

// Both fixtures hold the same 13-column sheet: five clients with amounts
// 40000, 20000, 35000, "N/A" and 30000, and a reference column mixing
// zero-padded text with one plain number.
fn assert_cartera_result(report: &pipeline::PipelineReport, file_name: &str) {
    assert!(report.errors.is_empty(), "unexpected errors: {:?}", report.errors);
    assert_eq!(report.result.len(), 2);

    let rows = report.result.rows();
    assert_eq!(rows[0].document, Cell::text("CC"));
    assert_eq!(rows[0].document_number, Cell::Number(80123456.0));
    assert_eq!(rows[0].name, Cell::text("Ana Pérez"));
    assert_eq!(rows[0].reference, "00123");
    assert_eq!(rows[0].amount, Some(40000.0));

    assert_eq!(rows[1].name, Cell::text("Luis Gómez"));
    assert_eq!(rows[1].document_number, Cell::Number(1020304050.0));
    assert_eq!(rows[1].reference, "789");
    assert_eq!(rows[1].amount, Some(35000.0));

    assert!(rows.iter().all(|row| row.source_file == file_name));
}

#[test]
fn test_shared_strings_workbook() {
    let files = vec![UploadedFile::new("cartera.xlsx", SHARED_STRINGS_XLSX)];
    let report = pipeline::run(&files);

    assert_cartera_result(&report, "cartera.xlsx");
}

#[test]
fn test_legacy_xls_workbook() {
    let files = vec![UploadedFile::new("cartera.xls", LEGACY_XLS)];
    let report = pipeline::run(&files);

    assert_cartera_result(&report, "cartera.xls");
}

#[test]
fn test_mixed_formats_keep_upload_order() {
    let files = vec![
        UploadedFile::new("antigua.xls", LEGACY_XLS),
        UploadedFile::new("nueva.xlsx", SHARED_STRINGS_XLSX),
    ];
    let report = pipeline::run(&files);

    assert!(report.errors.is_empty());
    let sources: Vec<_> = report
        .result
        .indexed()
        .map(|r| (r.index, r.row.source_file.as_str()))
        .collect();
    assert_eq!(
        sources,
        vec![
            (0, "antigua.xls"),
            (1, "antigua.xls"),
            (2, "nueva.xlsx"),
            (3, "nueva.xlsx"),
        ]
    );
}

#[test]
fn test_legacy_xls_detected_without_extension() {
    // Content sniffing picks up the compound-file signature
    let files = vec![UploadedFile::new("descarga", LEGACY_XLS)];
    let report = pipeline::run(&files);

    assert!(report.errors.is_empty());
    assert_eq!(report.result.len(), 2);
}
