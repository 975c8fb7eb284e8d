use thiserror::Error;

use crate::models::{Cell, ExtractedRow, RawTable, REQUIRED_COLUMNS, SOURCE_COLUMNS};
use crate::services::reader::ReadError;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("unsupported file type, expected .xlsx or .xls")]
    UnsupportedFormat,

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error("expected at least {required} columns, found {found}")]
    TooFewColumns { found: usize, required: usize },
}

/// Projects every row of `table` onto the fixed output fields.
///
/// Columns are chosen by position only; header text is ignored. The
/// amount becomes missing when it is not numeric and the reference is
/// always kept as text.
pub fn extract_rows(
    table: &RawTable,
    source_file: &str,
) -> Result<Vec<ExtractedRow>, ExtractionError> {
    if table.width < REQUIRED_COLUMNS {
        return Err(ExtractionError::TooFewColumns {
            found: table.width,
            required: REQUIRED_COLUMNS,
        });
    }

    let [document, document_number, name, reference, amount] = SOURCE_COLUMNS;

    Ok(table
        .rows
        .iter()
        .map(|row| ExtractedRow {
            document: row[document].clone(),
            document_number: row[document_number].clone(),
            name: row[name].clone(),
            reference: coerce_reference(&row[reference]),
            amount: row[amount].to_amount(),
            source_file: source_file.to_string(),
        })
        .collect())
}

fn coerce_reference(cell: &Cell) -> String {
    cell.display_text()
}

/// Keeps rows whose amount is present and strictly above the threshold,
/// in their original order.
pub fn filter_rows(mut rows: Vec<ExtractedRow>) -> Vec<ExtractedRow> {
    rows.retain(ExtractedRow::passes_threshold);
    rows
}
