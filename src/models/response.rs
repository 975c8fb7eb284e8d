use serde::Serialize;

use crate::models::request::XLSX_MIME_TYPE;
use crate::models::table::{IndexedRow, ResultTable};
use crate::services::pipeline::{FileError, PipelineReport};

pub const EXPORT_FILE_NAME: &str = "clientes_mayores_30k.xlsx";

#[derive(Debug, Serialize)]
pub struct FilterResponse<'a> {
    pub success: bool,
    pub data: FilterData<'a>,
    pub processing_time_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct FilterData<'a> {
    pub count: usize,
    pub message: String,
    pub rows: Vec<IndexedRow<'a>>,
    pub errors: Vec<FileErrorReport>,
    pub export: Option<ExportInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileErrorReport {
    pub file_name: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportInfo {
    pub file_name: String,
    pub mime_type: String,
}

impl<'a> FilterResponse<'a> {
    pub fn new(report: &'a PipelineReport) -> Self {
        let export = (!report.result.is_empty()).then(ExportInfo::default_artifact);

        Self {
            success: true,
            data: FilterData {
                count: report.result.len(),
                message: summary_message(&report.result),
                rows: report.result.indexed().collect(),
                errors: report.errors.iter().map(FileErrorReport::from).collect(),
                export,
            },
            processing_time_ms: report.processing_time_ms,
        }
    }
}

impl From<&FileError> for FileErrorReport {
    fn from(error: &FileError) -> Self {
        Self {
            file_name: error.file_name.clone(),
            message: error.to_string(),
        }
    }
}

impl ExportInfo {
    pub fn default_artifact() -> Self {
        Self {
            file_name: EXPORT_FILE_NAME.to_string(),
            mime_type: XLSX_MIME_TYPE.to_string(),
        }
    }
}

pub fn summary_message(result: &ResultTable) -> String {
    if result.is_empty() {
        "No se encontraron registros con montos mayores a 30K.".to_string()
    } else {
        format!("Se encontraron {} clientes con montos > 30K", result.len())
    }
}
