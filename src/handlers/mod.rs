pub mod filter;
pub mod health;
pub mod index;

pub use filter::*;
pub use health::*;
pub use index::*;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::middleware::{logging_middleware, rate_limit_middleware, RequestLimiter};

pub fn create_router(config: &Config) -> Router {
    let limiter = RequestLimiter::from_config(config);

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/api/v1/filter", post(filter_handler))
        .route("/api/v1/filter/export", post(export_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(config.max_upload_bytes()))
                .layer(axum::middleware::from_fn(logging_middleware))
                .layer(axum::middleware::from_fn_with_state(
                    limiter.clone(),
                    rate_limit_middleware,
                )),
        )
        .with_state(limiter)
}
