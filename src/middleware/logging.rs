//! Request logging middleware.
//!
//! Each request runs inside an `http_request` span; one line is emitted when
//! the response is ready, at a level chosen from the status class.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::{Duration, Instant};
use tracing::{info, warn, Instrument, Span};

/// Paths served without a log line.
const QUIET_PATHS: &[&str] = &["/health"];

/// How a finished request is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Ok,
    Rejected,
    Failed,
}

impl Outcome {
    fn from_status(status: u16) -> Self {
        match status {
            500..=u16::MAX => Outcome::Failed,
            400..=499 => Outcome::Rejected,
            _ => Outcome::Ok,
        }
    }
}

pub async fn request_logging(request: Request<Body>, next: Next) -> Response {
    if QUIET_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let span = tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        query = request.uri().query().unwrap_or_default(),
        status = tracing::field::Empty,
        latency_ms = tracing::field::Empty,
    );

    let start = Instant::now();
    let response = next.run(request).instrument(span.clone()).await;
    let status = response.status().as_u16();

    span.in_scope(|| log_completion(status, start.elapsed()));

    response
}

fn log_completion(status: u16, latency: Duration) {
    let latency_ms = latency.as_millis() as u64;
    Span::current().record("status", status);
    Span::current().record("latency_ms", latency_ms);

    match Outcome::from_status(status) {
        Outcome::Failed => warn!(status, latency_ms, "Request failed"),
        Outcome::Rejected => info!(status, latency_ms, "Request rejected"),
        Outcome::Ok => info!(status, latency_ms, "Request completed"),
    }
}
