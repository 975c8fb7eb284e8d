use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, DataType, Reader};
use thiserror::Error;

use crate::models::{Cell, RawTable};

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("cannot open workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("workbook has no worksheets")]
    NoWorksheet,
}

/// Parses the first worksheet of a workbook held in memory.
///
/// The first non-empty row is the header. Columns keep their absolute sheet
/// position, so a blank column A still counts as position 0.
pub fn read_first_sheet(content: &[u8]) -> Result<RawTable, ReadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(content))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ReadError::NoWorksheet)??;

    let Some((_, start_col)) = range.start() else {
        tracing::debug!("First worksheet is empty");
        return Ok(RawTable::default());
    };

    let offset = start_col as usize;
    let mut rows = range.rows().map(|cells| {
        std::iter::repeat(Cell::Empty)
            .take(offset)
            .chain(cells.iter().map(convert_cell))
            .collect::<Vec<_>>()
    });

    let header = rows.next().unwrap_or_default();
    let table = RawTable::new(header, rows.collect());

    tracing::debug!(
        columns = table.width,
        rows = table.row_count(),
        "Parsed first worksheet"
    );

    Ok(table)
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(text) => Cell::Text(text.clone()),
        Data::Float(number) => Cell::Number(*number),
        Data::Int(number) => Cell::Number(*number as f64),
        Data::Bool(flag) => Cell::Bool(*flag),
        Data::DateTime(_) => data
            .as_datetime()
            .map(|value| Cell::Text(value.format("%Y-%m-%d %H:%M:%S").to_string()))
            .unwrap_or_default(),
        Data::DateTimeIso(text) | Data::DurationIso(text) => Cell::Text(text.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_spreadsheet_bytes() {
        let err = read_first_sheet(b"DOCUMENTO;NOMBRE\n1;Ana\n").unwrap_err();
        assert!(matches!(err, ReadError::Workbook(_)));
    }

    #[test]
    fn test_convert_cell() {
        assert_eq!(convert_cell(&Data::Int(7)), Cell::Number(7.0));
        assert_eq!(convert_cell(&Data::String("00123".into())), Cell::text("00123"));
        assert_eq!(convert_cell(&Data::Empty), Cell::Empty);
        assert_eq!(convert_cell(&Data::Bool(true)), Cell::Bool(true));
    }
}
