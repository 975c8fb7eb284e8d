pub mod extractor;
pub mod pipeline;
pub mod reader;
pub mod xlsx_writer;

pub use extractor::{extract_rows, filter_rows, ExtractionError};
pub use pipeline::{process_file, run, FileError, PipelineReport};
pub use reader::{read_first_sheet, ReadError};
pub use xlsx_writer::{export_result_table, write_workbook, ExportError, SheetData};
