//! Minimal OOXML workbook writer.
//!
//! Produces a single-sheet `.xlsx` with inline strings, a bold header row,
//! per-column text formatting and fitted column widths. Output bytes depend
//! only on the input cells.

use std::io::{Cursor, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::models::{Cell, ResultTable, OUTPUT_HEADERS, REFERENCE_COLUMN};

/// Extra characters added to the widest cell of each column.
pub const WIDTH_PADDING: usize = 3;

const SHEET_NAME: &str = "Sheet1";
const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

const STYLE_HEADER: &str = "1";
const STYLE_TEXT: &str = "2";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

// cellXfs: 0 default, 1 header (bold, centered, thin border), 2 text ("@", builtin 49).
const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="2"><font><sz val="11"/><name val="Calibri"/><family val="2"/></font><font><b/><sz val="11"/><name val="Calibri"/><family val="2"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="2"><border><left/><right/><top/><bottom/><diagonal/></border><border><left style="thin"/><right style="thin"/><top style="thin"/><bottom style="thin"/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="3"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="0" borderId="1" xfId="0" applyFont="1" applyBorder="1" applyAlignment="1"><alignment horizontal="center" vertical="top"/></xf><xf numFmtId="49" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("XML serialization failed: {0}")]
    Xml(String),

    #[error("Archive write failed: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Contents of the single worksheet to write.
#[derive(Debug, Clone, Default)]
pub struct SheetData {
    pub header: Vec<Cell>,
    pub rows: Vec<Vec<Cell>>,
    /// Columns whose data cells are formatted as text.
    pub text_columns: Vec<usize>,
}

impl SheetData {
    pub fn new(header: Vec<Cell>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            header,
            rows,
            text_columns: Vec::new(),
        }
    }

    pub fn with_text_column(mut self, column: usize) -> Self {
        self.text_columns.push(column);
        self
    }

    fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0)
    }
}

/// Builds the download artifact for a non-empty result.
pub fn export_result_table(table: &ResultTable) -> Result<Vec<u8>, ExportError> {
    let header = OUTPUT_HEADERS.iter().map(|label| Cell::text(*label)).collect();
    let rows = table.rows().iter().map(|row| row.cells().to_vec()).collect();

    let sheet = SheetData::new(header, rows).with_text_column(REFERENCE_COLUMN);
    let bytes = write_workbook(&sheet)?;

    tracing::debug!(rows = table.len(), bytes = bytes.len(), "Workbook exported");
    Ok(bytes)
}

/// Width of every column: longest string form among header and data cells,
/// plus padding.
pub fn column_widths(sheet: &SheetData) -> Vec<usize> {
    let mut widths = vec![0; sheet.column_count()];

    for row in std::iter::once(&sheet.header).chain(sheet.rows.iter()) {
        for (column, cell) in row.iter().enumerate() {
            let length = cell.display_text().chars().count();
            widths[column] = widths[column].max(length);
        }
    }

    widths.into_iter().map(|w| w + WIDTH_PADDING).collect()
}

pub fn write_workbook(sheet: &SheetData) -> Result<Vec<u8>, ExportError> {
    let sheet_xml = sheet_xml(sheet)?;
    let workbook_xml = workbook_xml()?;

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let parts: [(&str, &[u8]); 6] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes()),
        ("_rels/.rels", ROOT_RELS_XML.as_bytes()),
        ("xl/workbook.xml", workbook_xml.as_slice()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS_XML.as_bytes()),
        ("xl/styles.xml", STYLES_XML.as_bytes()),
        ("xl/worksheets/sheet1.xml", sheet_xml.as_slice()),
    ];

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in parts {
        zip.start_file(name, options)?;
        zip.write_all(data)?;
    }

    Ok(zip.finish()?.into_inner())
}

/// Spreadsheet column letters for a zero-based index: 0 -> A, 26 -> AA.
pub fn column_name(index: usize) -> String {
    let mut name = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        name.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

fn xml_error(err: impl std::fmt::Display) -> ExportError {
    ExportError::Xml(err.to_string())
}

struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    fn new() -> Result<Self, ExportError> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(xml_error)?;
        Ok(Self { writer })
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), ExportError> {
        let element = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.writer.write_event(Event::Start(element)).map_err(xml_error)
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), ExportError> {
        let element = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.writer.write_event(Event::Empty(element)).map_err(xml_error)
    }

    fn end(&mut self, name: &str) -> Result<(), ExportError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_error)
    }

    fn text(&mut self, text: &str) -> Result<(), ExportError> {
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_error)
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

fn workbook_xml() -> Result<Vec<u8>, ExportError> {
    let mut out = XmlOut::new()?;
    out.start(
        "workbook",
        &[
            ("xmlns", MAIN_NS),
            (
                "xmlns:r",
                "http://schemas.openxmlformats.org/officeDocument/2006/relationships",
            ),
        ],
    )?;
    out.start("sheets", &[])?;
    out.empty(
        "sheet",
        &[("name", SHEET_NAME), ("sheetId", "1"), ("r:id", "rId1")],
    )?;
    out.end("sheets")?;
    out.end("workbook")?;
    Ok(out.finish())
}

fn sheet_xml(sheet: &SheetData) -> Result<Vec<u8>, ExportError> {
    let columns = sheet.column_count();
    let widths = column_widths(sheet);

    let mut out = XmlOut::new()?;
    out.start("worksheet", &[("xmlns", MAIN_NS)])?;

    if columns > 0 {
        let dimension = format!(
            "A1:{}{}",
            column_name(columns - 1),
            sheet.rows.len() + 1
        );
        out.empty("dimension", &[("ref", dimension.as_str())])?;

        out.start("cols", &[])?;
        for (index, width) in widths.iter().enumerate() {
            let position = (index + 1).to_string();
            let width = width.to_string();
            out.empty(
                "col",
                &[
                    ("min", position.as_str()),
                    ("max", position.as_str()),
                    ("width", width.as_str()),
                    ("customWidth", "1"),
                ],
            )?;
        }
        out.end("cols")?;
    }

    out.start("sheetData", &[])?;
    write_row(&mut out, 1, &sheet.header, |_| Some(STYLE_HEADER))?;
    for (offset, row) in sheet.rows.iter().enumerate() {
        write_row(&mut out, offset + 2, row, |column| {
            sheet.text_columns.contains(&column).then_some(STYLE_TEXT)
        })?;
    }
    out.end("sheetData")?;

    out.end("worksheet")?;
    Ok(out.finish())
}

fn write_row<F>(out: &mut XmlOut, number: usize, cells: &[Cell], style: F) -> Result<(), ExportError>
where
    F: Fn(usize) -> Option<&'static str>,
{
    let row_ref = number.to_string();
    out.start("row", &[("r", row_ref.as_str())])?;

    for (column, cell) in cells.iter().enumerate() {
        let reference = format!("{}{}", column_name(column), number);
        let mut attrs = vec![("r", reference.as_str())];
        if let Some(style) = style(column) {
            attrs.push(("s", style));
        }

        match cell {
            Cell::Number(value) if !value.is_finite() => {
                if attrs.len() > 1 {
                    out.empty("c", &attrs)?;
                }
            }
            Cell::Empty => {
                if attrs.len() > 1 {
                    out.empty("c", &attrs)?;
                }
            }
            Cell::Text(text) => {
                attrs.push(("t", "inlineStr"));
                out.start("c", &attrs)?;
                out.start("is", &[])?;
                out.start("t", &[("xml:space", "preserve")])?;
                out.text(text)?;
                out.end("t")?;
                out.end("is")?;
                out.end("c")?;
            }
            Cell::Number(value) => {
                out.start("c", &attrs)?;
                out.start("v", &[])?;
                out.text(&value.to_string())?;
                out.end("v")?;
                out.end("c")?;
            }
            Cell::Bool(flag) => {
                attrs.push(("t", "b"));
                out.start("c", &attrs)?;
                out.start("v", &[])?;
                out.text(if *flag { "1" } else { "0" })?;
                out.end("v")?;
                out.end("c")?;
            }
        }
    }

    out.end("row")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExtractedRow;
    use std::io::Read;

    fn result_row(reference: &str, amount: f64, source: &str) -> ExtractedRow {
        ExtractedRow {
            document: Cell::text("CC"),
            document_number: Cell::Number(52000111.0),
            name: Cell::text("Maria Gomez"),
            reference: reference.to_string(),
            amount: Some(amount),
            source_file: source.to_string(),
        }
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut xml = String::new();
        part.read_to_string(&mut xml).unwrap();
        xml
    }

    #[test]
    fn test_column_name() {
        assert_eq!(column_name(0), "A");
        assert_eq!(column_name(3), "D");
        assert_eq!(column_name(25), "Z");
        assert_eq!(column_name(26), "AA");
        assert_eq!(column_name(27), "AB");
        assert_eq!(column_name(701), "ZZ");
        assert_eq!(column_name(702), "AAA");
    }

    #[test]
    fn test_reference_width_uses_header_when_longer() {
        let table = ResultTable::concat(vec![vec![
            result_row("REF00001", 40000.0, "a.xlsx"),
            result_row("R1", 50000.0, "a.xlsx"),
        ]]);
        let header = OUTPUT_HEADERS.iter().map(|l| Cell::text(*l)).collect();
        let rows = table.rows().iter().map(|r| r.cells().to_vec()).collect();
        let widths = column_widths(&SheetData::new(header, rows));

        assert_eq!(widths[REFERENCE_COLUMN], 13);
        assert_eq!(widths[2], "Maria Gomez".len() + 3);
        assert_eq!(widths[1], "NUMERO DE DOCUMENTO".len() + 3);
    }

    #[test]
    fn test_widths_count_characters_not_bytes() {
        let sheet = SheetData::new(
            vec![Cell::text("N")],
            vec![vec![Cell::text("Muñoz Peña")]],
        );
        assert_eq!(column_widths(&sheet), vec![13]);
    }

    #[test]
    fn test_reference_cells_use_text_style() {
        let table = ResultTable::concat(vec![vec![
            result_row("00123", 40000.0, "a.xlsx"),
            result_row("00456", 45000.0, "a.xlsx"),
        ]]);
        let bytes = export_result_table(&table).unwrap();
        let xml = read_part(&bytes, "xl/worksheets/sheet1.xml");

        assert!(xml.contains(r#"<c r="D2" s="2" t="inlineStr">"#));
        assert!(xml.contains(r#"<c r="D3" s="2" t="inlineStr">"#));
        assert!(xml.contains(r#"<c r="D1" s="1" t="inlineStr">"#));
        assert!(!xml.contains(r#"<c r="E2" s="2""#));
        assert!(xml.contains(r#"<col min="4" max="4" width="13" customWidth="1"/>"#));
        assert!(xml.contains(r#"<dimension ref="A1:F3"/>"#));
        assert!(xml.contains("00123"));
    }

    #[test]
    fn test_text_is_escaped() {
        let sheet = SheetData::new(vec![Cell::text("A & B <c>")], vec![]);
        let bytes = write_workbook(&sheet).unwrap();
        let xml = read_part(&bytes, "xl/worksheets/sheet1.xml");
        assert!(xml.contains("A &amp; B &lt;c&gt;"));
    }

    #[test]
    fn test_styles_define_text_format() {
        let bytes = write_workbook(&SheetData::default()).unwrap();
        let styles = read_part(&bytes, "xl/styles.xml");
        assert!(styles.contains(r#"numFmtId="49""#));
        let workbook = read_part(&bytes, "xl/workbook.xml");
        assert!(workbook.contains(r#"name="Sheet1""#));
    }

    #[test]
    fn test_output_is_deterministic() {
        let table = ResultTable::concat(vec![vec![result_row("X-1", 99999.5, "a.xlsx")]]);
        let first = export_result_table(&table).unwrap();
        let second = export_result_table(&table).unwrap();
        assert_eq!(first, second);
    }
}
