use serde::{Serialize, Serializer};

/// Zero-based sheet positions of the extracted columns, in output order:
/// DOCUMENT, DOCUMENT_NUMBER, NAME, REFERENCE, AMOUNT.
pub const SOURCE_COLUMNS: [usize; 5] = [1, 2, 3, 8, 12];

/// A sheet must reach the last positional column to be extractable.
pub const REQUIRED_COLUMNS: usize = 13;

/// Rows are kept only when their amount is strictly greater than this.
pub const AMOUNT_THRESHOLD: f64 = 30_000.0;

/// Header labels of the exported workbook, in column order.
pub const OUTPUT_HEADERS: [&str; 6] = [
    "DOCUMENTO",
    "NUMERO DE DOCUMENTO",
    "NOMBRE",
    "REFERENCIA",
    "MONTO",
    "ARCHIVO DE ORIGEN",
];

/// Output position of the REFERENCE column (forced to text format on export).
pub const REFERENCE_COLUMN: usize = 3;

/// A single spreadsheet cell after parsing.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// String form of the cell, as shown in a sheet and used for column sizing.
    pub fn display_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(text) => text.clone(),
            Cell::Number(number) => format_number(*number),
            Cell::Bool(true) => "True".to_string(),
            Cell::Bool(false) => "False".to_string(),
        }
    }

    /// Numeric coercion: anything that is not a finite number becomes missing.
    pub fn to_amount(&self) -> Option<f64> {
        let value = match self {
            Cell::Number(number) => *number,
            Cell::Text(text) => text.trim().parse::<f64>().ok()?,
            Cell::Bool(flag) => {
                if *flag {
                    1.0
                } else {
                    0.0
                }
            }
            Cell::Empty => return None,
        };

        value.is_finite().then_some(value)
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Empty => serializer.serialize_none(),
            Cell::Text(text) => serializer.serialize_str(text),
            Cell::Number(number) => serializer.serialize_f64(*number),
            Cell::Bool(flag) => serializer.serialize_bool(*flag),
        }
    }
}

/// Whole numbers print without a fractional part so numeric-looking
/// references read the way they were typed.
pub fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        format!("{}", number)
    }
}

/// The first worksheet of an upload: one header row plus data rows,
/// every row padded to `width` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub header: Vec<Cell>,
    pub rows: Vec<Vec<Cell>>,
    pub width: usize,
}

impl RawTable {
    pub fn new(header: Vec<Cell>, rows: Vec<Vec<Cell>>) -> Self {
        let width = rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(header.len()))
            .max()
            .unwrap_or(0);

        let pad = |mut row: Vec<Cell>| {
            row.resize(width, Cell::Empty);
            row
        };

        Self {
            header: pad(header),
            rows: rows.into_iter().map(pad).collect(),
            width,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// One source row projected onto the fixed output fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ExtractedRow {
    pub document: Cell,
    pub document_number: Cell,
    pub name: Cell,
    pub reference: String,
    pub amount: Option<f64>,
    pub source_file: String,
}

impl ExtractedRow {
    pub fn passes_threshold(&self) -> bool {
        matches!(self.amount, Some(amount) if amount > AMOUNT_THRESHOLD)
    }

    /// Cells in export column order.
    pub fn cells(&self) -> [Cell; 6] {
        [
            self.document.clone(),
            self.document_number.clone(),
            self.name.clone(),
            Cell::Text(self.reference.clone()),
            self.amount.map(Cell::Number).unwrap_or_default(),
            Cell::Text(self.source_file.clone()),
        ]
    }
}

/// A row of the combined result together with its output position.
#[derive(Debug, Clone, Serialize)]
pub struct IndexedRow<'a> {
    pub index: usize,
    #[serde(flatten)]
    pub row: &'a ExtractedRow,
}

/// Concatenation of every file's filtered rows in upload order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    rows: Vec<ExtractedRow>,
}

impl ResultTable {
    pub fn concat<I>(tables: I) -> Self
    where
        I: IntoIterator<Item = Vec<ExtractedRow>>,
    {
        Self {
            rows: tables.into_iter().flatten().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[ExtractedRow] {
        &self.rows
    }

    /// Rows numbered with a fresh sequence starting at 0.
    pub fn indexed(&self) -> impl Iterator<Item = IndexedRow<'_>> {
        self.rows
            .iter()
            .enumerate()
            .map(|(index, row)| IndexedRow { index, row })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(amount: Option<f64>, source: &str) -> ExtractedRow {
        ExtractedRow {
            document: Cell::text("CC"),
            document_number: Cell::Number(1020.0),
            name: Cell::text("Ana"),
            reference: "00123".to_string(),
            amount,
            source_file: source.to_string(),
        }
    }

    #[test]
    fn test_amount_coercion() {
        assert_eq!(Cell::Number(40000.0).to_amount(), Some(40000.0));
        assert_eq!(Cell::text(" 30000.01 ").to_amount(), Some(30000.01));
        assert_eq!(Cell::text("N/A").to_amount(), None);
        assert_eq!(Cell::text("1,000").to_amount(), None);
        assert_eq!(Cell::Empty.to_amount(), None);
        assert_eq!(Cell::Number(f64::NAN).to_amount(), None);
        assert_eq!(Cell::text("inf").to_amount(), None);
        assert_eq!(Cell::Bool(true).to_amount(), Some(1.0));
    }

    #[test]
    fn test_display_text() {
        assert_eq!(Cell::Number(123.0).display_text(), "123");
        assert_eq!(Cell::Number(30000.01).display_text(), "30000.01");
        assert_eq!(Cell::text("00123").display_text(), "00123");
        assert_eq!(Cell::Empty.display_text(), "");
        assert_eq!(Cell::Bool(false).display_text(), "False");
    }

    #[test]
    fn test_raw_table_pads_rows() {
        let table = RawTable::new(
            vec![Cell::text("a"), Cell::text("b")],
            vec![vec![Cell::Number(1.0)], vec![Cell::Empty, Cell::Empty, Cell::text("x")]],
        );
        assert_eq!(table.width, 3);
        assert_eq!(table.header.len(), 3);
        assert!(table.rows.iter().all(|row| row.len() == 3));
    }

    #[test]
    fn test_threshold_is_strict() {
        assert!(!row(Some(30000.0), "a.xlsx").passes_threshold());
        assert!(row(Some(30000.01), "a.xlsx").passes_threshold());
        assert!(!row(None, "a.xlsx").passes_threshold());
    }

    #[test]
    fn test_result_table_concat_renumbers() {
        let table = ResultTable::concat(vec![
            vec![row(Some(40000.0), "a.xlsx"), row(Some(50000.0), "a.xlsx")],
            vec![],
            vec![row(Some(60000.0), "b.xlsx")],
        ]);
        let indexed: Vec<_> = table
            .indexed()
            .map(|r| (r.index, r.row.source_file.clone()))
            .collect();
        assert_eq!(
            indexed,
            vec![
                (0, "a.xlsx".to_string()),
                (1, "a.xlsx".to_string()),
                (2, "b.xlsx".to_string())
            ]
        );
    }

    #[test]
    fn test_indexed_row_serialization() {
        let table = ResultTable::concat(vec![vec![row(Some(40000.0), "a.xlsx")]]);
        let value = serde_json::to_value(table.indexed().next().unwrap()).unwrap();
        assert_eq!(value["index"], 0);
        assert_eq!(value["REFERENCE"], "00123");
        assert_eq!(value["AMOUNT"], 40000.0);
        assert_eq!(value["SOURCE_FILE"], "a.xlsx");
        assert_eq!(value["DOCUMENT_NUMBER"], 1020.0);
    }
}
