use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::AppError;

/// Caps how many filter or export requests run at once.
///
/// Cloning is cheap; every clone shares the same permits and counters, so the
/// middleware and `/health` see one limiter.
#[derive(Debug, Clone)]
pub struct RequestLimiter {
    inner: Arc<LimiterState>,
}

#[derive(Debug)]
struct LimiterState {
    semaphore: Semaphore,
    max_concurrent: usize,
    total: AtomicU64,
    rejected: AtomicU64,
}

/// Snapshot of the limiter counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimiterMetrics {
    pub total_requests: u64,
    pub rejected_requests: u64,
    pub available_permits: usize,
    pub max_concurrent: usize,
}

impl LimiterMetrics {
    pub fn rejection_rate(&self) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }
        (self.rejected_requests as f64 / self.total_requests as f64 * 100.0).round() / 100.0
    }
}

impl RequestLimiter {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            inner: Arc::new(LimiterState {
                semaphore: Semaphore::new(max_concurrent),
                max_concurrent,
                total: AtomicU64::new(0),
                rejected: AtomicU64::new(0),
            }),
        }
    }

    /// `Config::validate` already rejects a zero limit.
    pub fn from_config(config: &Config) -> Self {
        info!(
            max_concurrent_requests = config.max_concurrent_requests,
            "Initializing request limiter"
        );
        Self::new(config.max_concurrent_requests)
    }

    /// Counts the request and takes a permit, or rejects it when all are in use.
    pub fn try_acquire(&self) -> Result<SemaphorePermit<'_>, AppError> {
        let total_requests = self.inner.total.fetch_add(1, Ordering::Relaxed) + 1;

        self.inner.semaphore.try_acquire().map_err(|_| {
            let rejected = self.inner.rejected.fetch_add(1, Ordering::Relaxed) + 1;
            warn!(
                total_requests,
                rejected_requests = rejected,
                max_concurrent = self.inner.max_concurrent,
                "Rate limit exceeded - too many concurrent requests"
            );
            AppError::RateLimitExceeded
        })
    }

    pub fn available_permits(&self) -> usize {
        self.inner.semaphore.available_permits()
    }

    pub fn metrics(&self) -> LimiterMetrics {
        LimiterMetrics {
            total_requests: self.inner.total.load(Ordering::Relaxed),
            rejected_requests: self.inner.rejected.load(Ordering::Relaxed),
            available_permits: self.available_permits(),
            max_concurrent: self.inner.max_concurrent,
        }
    }
}

pub async fn rate_limit_middleware(
    State(limiter): State<RequestLimiter>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = request.uri().path().to_string();

    // Only the processing endpoints are limited
    if !path.starts_with("/api/") {
        return Ok(next.run(request).await);
    }

    let _permit = limiter.try_acquire()?;

    debug!(
        path = %path,
        available_permits = limiter.available_permits(),
        "Request permit acquired"
    );

    let response = next.run(request).await;

    debug!(path = %path, "Request completed, permit released");

    Ok(response)
}
