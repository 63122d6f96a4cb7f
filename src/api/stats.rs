//! `GET /api/stats`: per-website chat totals, optionally date-filtered.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, warn};

use crate::models::AggregateRecord;
use crate::stats::{process_statistics, EventSource, StatsError};

/// Shared state for the stats routes.
#[derive(Clone)]
pub struct StatsState {
    pub source: Arc<dyn EventSource>,
}

impl StatsState {
    pub fn new(source: Arc<dyn EventSource>) -> Self {
        Self { source }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    /// `YYYY-MM-DD`, inclusive
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`, inclusive
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn get_stats(
    State(state): State<Arc<StatsState>>,
    query: Result<Query<StatsQuery>, QueryRejection>,
) -> Result<Json<Vec<AggregateRecord>>, ApiError> {
    let Query(params) = query?;
    let report = process_statistics(
        state.source.as_ref(),
        params.start_date.as_deref(),
        params.end_date.as_deref(),
    )
    .await?;

    for skipped in &report.skipped {
        warn!(
            index = skipped.index,
            reason = %skipped.reason,
            "Skipping invalid entry"
        );
    }
    debug!(
        websites = report.records.len(),
        skipped = report.skipped.len(),
        excluded = report.excluded,
        "Statistics aggregated"
    );

    Ok(Json(report.records))
}

/// Every stats failure maps to a 500 carrying the error's message.
#[derive(Debug)]
pub enum ApiError {
    Stats(StatsError),
    /// Query string that could not be deserialized (duplicate keys, bad encoding)
    Query(String),
}

impl From<StatsError> for ApiError {
    fn from(err: StatsError) -> Self {
        ApiError::Stats(err)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Query(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::Stats(err @ StatsError::SourceUnavailable(_)) => {
                error!("{}", err);
                err.to_string()
            }
            ApiError::Stats(err) => {
                warn!("Rejected stats request: {}", err);
                err.to_string()
            }
            ApiError::Query(msg) => {
                warn!("Rejected stats query: {}", msg);
                msg.clone()
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
