//! Metrics responder.
//!
//! Serves the latest published throughput at `/metrics` in Prometheus
//! text exposition format. Everything else is a 404.

pub mod router;

pub use router::{build_router, serve};

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use std::fmt::Write;

use crate::models::{DiskMetrics, MetricsStore};
use crate::METRICS_PATH;

pub const NOT_FOUND_BODY: &str = "Not Found";
pub const NOT_READY_BODY: &str = "Metrics not ready";

const CONTENT_TYPE_TEXT: &str = "text/plain";

/// Status and body of a responder reply. Always `text/plain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsResponse {
    pub status: StatusCode,
    pub body: String,
}

impl MetricsResponse {
    fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn content_type(&self) -> &'static str {
        CONTENT_TYPE_TEXT
    }
}

impl IntoResponse for MetricsResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_TEXT))],
            self.body,
        )
            .into_response()
    }
}

/// Answer a request for `path` from the current store contents
pub fn handle_request(store: &MetricsStore, path: &str) -> MetricsResponse {
    if path != METRICS_PATH {
        return MetricsResponse::text(StatusCode::NOT_FOUND, NOT_FOUND_BODY);
    }

    match store.snapshot() {
        Some(metrics) => MetricsResponse::text(StatusCode::OK, render(&metrics)),
        None => MetricsResponse::text(StatusCode::SERVICE_UNAVAILABLE, NOT_READY_BODY),
    }
}

/// Render both gauges in Prometheus text exposition format
pub fn render(metrics: &DiskMetrics) -> String {
    let mut out = String::new();
    render_gauge(
        &mut out,
        "disk_read_megabytes_per_second",
        "Disk read megabytes per second",
        metrics.read_megabytes_per_second,
    );
    render_gauge(
        &mut out,
        "disk_write_megabytes_per_second",
        "Disk write megabytes per second",
        metrics.write_megabytes_per_second,
    );
    out
}

fn render_gauge(out: &mut String, name: &str, help: &str, value: u64) {
    let _ = writeln!(out, "# HELP {} {}", name, help);
    let _ = writeln!(out, "# TYPE {} gauge", name);
    let _ = writeln!(out, "{} {}", name, value);
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPECTED: &str = "\
# HELP disk_read_megabytes_per_second Disk read megabytes per second
# TYPE disk_read_megabytes_per_second gauge
disk_read_megabytes_per_second 150
# HELP disk_write_megabytes_per_second Disk write megabytes per second
# TYPE disk_write_megabytes_per_second gauge
disk_write_megabytes_per_second 120
";

    #[test]
    fn test_not_ready_before_first_publish() {
        let store = MetricsStore::new();
        let response = handle_request(&store, "/metrics");
        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.body, "Metrics not ready");
        assert_eq!(response.content_type(), "text/plain");
    }

    #[test]
    fn test_renders_published_values() {
        let store = MetricsStore::new();
        store.publish(DiskMetrics::new(150, 120));

        let response = handle_request(&store, "/metrics");
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, EXPECTED);
    }

    #[test]
    fn test_other_paths_are_not_found() {
        let store = MetricsStore::new();
        for path in ["/", "/anything-else", "/metrics/", "/Metrics"] {
            let response = handle_request(&store, path);
            assert_eq!(response.status, StatusCode::NOT_FOUND, "path {}", path);
            assert_eq!(response.body, "Not Found");
        }

        store.publish(DiskMetrics::new(1, 2));
        assert_eq!(
            handle_request(&store, "/anything-else").status,
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_into_response_sets_content_type() {
        let response = MetricsResponse::text(StatusCode::OK, "x").into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain"
        );
    }
}
