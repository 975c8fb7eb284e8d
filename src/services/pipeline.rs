use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{ExtractedRow, ResultTable, UploadedFile};
use crate::services::extractor::{extract_rows, filter_rows, ExtractionError};
use crate::services::reader::read_first_sheet;

/// A failure confined to one uploaded file.
#[derive(Error, Debug)]
#[error("Error procesando el archivo {file_name}: {source}")]
pub struct FileError {
    pub file_name: String,
    #[source]
    pub source: ExtractionError,
}

impl FileError {
    fn new(file_name: &str, source: impl Into<ExtractionError>) -> Self {
        Self {
            file_name: file_name.to_string(),
            source: source.into(),
        }
    }
}

/// Outcome of one run over a set of uploads.
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub result: ResultTable,
    pub errors: Vec<FileError>,
    pub files_received: usize,
    pub processing_time_ms: u64,
}

impl PipelineReport {
    pub fn files_succeeded(&self) -> usize {
        self.files_received - self.errors.len()
    }
}

/// Reads, extracts and filters a single upload.
pub fn process_file(file: &UploadedFile) -> Result<Vec<ExtractedRow>, FileError> {
    if !file.is_spreadsheet() {
        return Err(FileError::new(&file.name, ExtractionError::UnsupportedFormat));
    }

    let table = read_first_sheet(&file.content).map_err(|e| FileError::new(&file.name, e))?;
    let extracted = extract_rows(&table, &file.name).map_err(|e| FileError::new(&file.name, e))?;
    let rows_read = extracted.len();
    let matched = filter_rows(extracted);

    info!(
        file_name = %file.name,
        rows_read,
        rows_matched = matched.len(),
        "File processed"
    );

    Ok(matched)
}

/// Processes every upload in order. A failing file is recorded and skipped;
/// the remaining files are still processed.
pub fn run(files: &[UploadedFile]) -> PipelineReport {
    let start = Instant::now();
    info!(files = files.len(), "Starting filter run");

    let mut tables = Vec::with_capacity(files.len());
    let mut errors = Vec::new();

    for file in files {
        debug!(file_name = %file.name, file_size = file.size, "Processing file");
        match process_file(file) {
            Ok(rows) => tables.push(rows),
            Err(e) => {
                warn!(file_name = %e.file_name, error = %e.source, "File skipped");
                errors.push(e);
            }
        }
    }

    let result = ResultTable::concat(tables);
    let processing_time_ms = start.elapsed().as_millis() as u64;

    info!(
        files = files.len(),
        failed = errors.len(),
        matching_rows = result.len(),
        processing_time_ms,
        "Filter run completed"
    );

    PipelineReport {
        result,
        errors,
        files_received: files.len(),
        processing_time_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_files_gives_empty_report() {
        let report = run(&[]);
        assert!(report.result.is_empty());
        assert!(report.errors.is_empty());
        assert_eq!(report.files_succeeded(), 0);
    }

    #[test]
    fn test_unsupported_file_is_isolated() {
        let files = vec![
            UploadedFile::new("notas.txt", b"hola".to_vec()),
            UploadedFile::new("datos.csv", b"a,b,c".to_vec()),
        ];
        let report = run(&files);
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.errors[0].file_name, "notas.txt");
        assert!(matches!(
            report.errors[1].source,
            ExtractionError::UnsupportedFormat
        ));
        assert_eq!(
            report.errors[0].to_string(),
            "Error procesando el archivo notas.txt: unsupported file type, expected .xlsx or .xls"
        );
    }
}
