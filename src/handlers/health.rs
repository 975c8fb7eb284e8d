use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use std::time::SystemTime;
use tracing::info;

use crate::error::AppResult;
use crate::middleware::RequestLimiter;

/// Health check endpoint
pub async fn health_handler(State(limiter): State<RequestLimiter>) -> AppResult<Json<Value>> {
    let timestamp = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let metrics = limiter.metrics();

    let response = json!({
        "status": "healthy",
        "timestamp": timestamp,
        "version": env!("CARGO_PKG_VERSION"),
        "rate_limiting": {
            "max_concurrent_requests": metrics.max_concurrent,
            "total_requests": metrics.total_requests,
            "rejected_requests": metrics.rejected_requests,
            "available_permits": metrics.available_permits,
            "rejection_rate": metrics.rejection_rate()
        }
    });

    info!(
        total_requests = metrics.total_requests,
        rejected_requests = metrics.rejected_requests,
        "Health check completed"
    );

    Ok(Json(response))
}

/// Readiness check endpoint
pub async fn ready_handler() -> StatusCode {
    StatusCode::OK
}
