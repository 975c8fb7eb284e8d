#![allow(dead_code)]

use client_filter::models::{Cell, UploadedFile};
use client_filter::services::{write_workbook, SheetData};

pub const COLUMNS: usize = 14;

/// A source sheet row with the five extracted positions filled in.
pub fn source_row(document_number: f64, name: &str, reference: Cell, amount: Cell) -> Vec<Cell> {
    let mut row: Vec<Cell> = (0..COLUMNS).map(|i| Cell::text(format!("x{}", i))).collect();
    row[1] = Cell::text("CC");
    row[2] = Cell::Number(document_number);
    row[3] = Cell::text(name);
    row[8] = reference;
    row[12] = amount;
    row
}

pub fn amount_row(amount: Cell) -> Vec<Cell> {
    source_row(1010.0, "Cliente", Cell::text("REF-1"), amount)
}

pub fn header(columns: usize) -> Vec<Cell> {
    // Header text never matters, only positions do
    (0..columns).map(|i| Cell::text(format!("Columna {}", i))).collect()
}

pub fn workbook(rows: Vec<Vec<Cell>>) -> Vec<u8> {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(COLUMNS);
    write_workbook(&SheetData::new(header(columns), rows)).unwrap()
}

pub fn upload(name: &str, rows: Vec<Vec<Cell>>) -> UploadedFile {
    UploadedFile::new(name, workbook(rows))
}

pub fn amounts_file(name: &str, amounts: &[f64]) -> UploadedFile {
    upload(
        name,
        amounts.iter().map(|a| amount_row(Cell::Number(*a))).collect(),
    )
}
