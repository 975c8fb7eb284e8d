use axum::{
    extract::Multipart,
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::time::Instant;
use tracing::{debug, error, info};

use crate::error::{AppError, AppResult};
use crate::models::{FilterResponse, UploadedFile, EXPORT_FILE_NAME, XLSX_MIME_TYPE};
use crate::services::{export_result_table, pipeline};

const FILE_FIELDS: [&str; 2] = ["files", "file"];

pub const MATCHING_ROWS_HEADER: &str = "x-matching-rows";
pub const FILE_ERRORS_HEADER: &str = "x-file-errors";

/// Runs the filter over every uploaded file and returns the combined rows as JSON.
pub async fn filter_handler(mut multipart: Multipart) -> AppResult<Response> {
    let start = Instant::now();
    let request_id = short_request_id();

    info!(request_id = %request_id, "Starting filter request");

    let files = collect_uploads(&mut multipart).await.map_err(|e| {
        error!(request_id = %request_id, error = %e, "Failed to read uploaded files");
        e
    })?;

    let report = tokio::task::spawn_blocking(move || pipeline::run(&files)).await?;

    let total_time = start.elapsed().as_millis() as u64;

    info!(
        request_id = %request_id,
        matching_rows = report.result.len(),
        failed_files = report.errors.len(),
        processing_time_ms = report.processing_time_ms,
        total_time_ms = total_time,
        "Filter request completed"
    );

    Ok(Json(FilterResponse::new(&report)).into_response())
}

/// Same input as [`filter_handler`], answered with the formatted workbook.
pub async fn export_handler(mut multipart: Multipart) -> AppResult<Response> {
    let request_id = short_request_id();

    info!(request_id = %request_id, "Starting export request");

    let files = collect_uploads(&mut multipart).await?;

    let (report, artifact) = tokio::task::spawn_blocking(move || -> AppResult<_> {
        let report = pipeline::run(&files);
        if report.result.is_empty() {
            return Err(AppError::NoResults);
        }
        let artifact = export_result_table(&report.result)?;
        Ok((report, artifact))
    })
    .await??;

    info!(
        request_id = %request_id,
        matching_rows = report.result.len(),
        artifact_bytes = artifact.len(),
        "Export request completed"
    );

    let headers = [
        (header::CONTENT_TYPE, XLSX_MIME_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
        ),
        (
            HeaderName::from_static(MATCHING_ROWS_HEADER),
            report.result.len().to_string(),
        ),
        (
            HeaderName::from_static(FILE_ERRORS_HEADER),
            report.errors.len().to_string(),
        ),
    ];

    Ok((StatusCode::OK, headers, artifact).into_response())
}

/// Collects every file field of the form, in upload order.
async fn collect_uploads(multipart: &mut Multipart) -> AppResult<Vec<UploadedFile>> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or("").to_string();

        if !FILE_FIELDS.contains(&field_name.as_str()) {
            debug!(field_name = %field_name, "Ignoring non-file form field");
            continue;
        }

        let Some(file_name) = field.file_name().map(str::to_string) else {
            return Err(AppError::validation(format!(
                "Form field '{}' must carry a file",
                field_name
            )));
        };

        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await?;

        let mut file = UploadedFile::new(file_name, data);
        if let Some(mime_type) = content_type {
            file = file.with_mime_type(mime_type);
        }

        debug!(
            file_name = %file.name,
            file_size = file.size,
            mime_type = ?file.mime_type,
            "Received upload"
        );

        files.push(file);
    }

    Ok(files)
}

fn short_request_id() -> String {
    uuid::Uuid::new_v4().to_string()[..8].to_string()
}
