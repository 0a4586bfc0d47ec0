//! Metrics collection and exposition.
//!
//! # Metrics
//! - `harness_requests_total` (counter): requests by route and status
//! - `harness_request_duration_seconds` (histogram): latency by route
//! - `harness_uploads_verified_total` (counter)
//! - `harness_uploads_failed_total` (counter)
//! - `harness_bytes_served_total` (counter): response payload bytes by route
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

pub fn record_request(route: &str, status: u16, start_time: Instant) {
    counter!(
        "harness_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("harness_request_duration_seconds", "route" => route.to_string())
        .record(start_time.elapsed().as_secs_f64());
}

pub fn record_upload(verified: bool) {
    if verified {
        counter!("harness_uploads_verified_total").increment(1);
    } else {
        counter!("harness_uploads_failed_total").increment(1);
    }
}

pub fn record_bytes_served(route: &'static str, bytes: usize) {
    counter!("harness_bytes_served_total", "route" => route).increment(bytes as u64);
}

/// Route-level middleware recording count and latency per matched route.
pub async fn track_request(request: Request, next: Next) -> Response {
    let start_time = Instant::now();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let response = next.run(request).await;
    record_request(&route, response.status().as_u16(), start_time);
    response
}
