//! HTTP surface: stats endpoint, health check, CORS and request logging.

pub mod stats;

use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tower_http::cors::CorsLayer;

use crate::middleware::request_logging;

pub use stats::{get_stats, health_check, ApiError, StatsQuery, StatsState};

/// Routes without layers, for mounting or direct testing.
pub fn stats_router() -> Router<Arc<StatsState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/stats", get(get_stats))
}

/// The full application served by the binary.
pub fn build_app(state: Arc<StatsState>) -> Router {
    stats_router()
        .with_state(state)
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
}
