//! Prometheus metrics for the API server.

use std::sync::LazyLock;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use regex_lite::Regex;

/// Install the Prometheus recorder and return its render handle.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "gigboard_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "gigboard_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "gigboard_http_requests_in_flight";

    // WebSocket metrics
    pub const WS_CONNECTIONS_TOTAL: &str = "gigboard_ws_connections_total";
    pub const WS_CONNECTIONS_ACTIVE: &str = "gigboard_ws_connections_active";
    pub const WS_MESSAGES_SENT: &str = "gigboard_ws_messages_sent_total";
    pub const WS_MESSAGES_DROPPED: &str = "gigboard_ws_messages_dropped_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record WebSocket connection.
pub fn record_ws_connection(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::WS_CONNECTIONS_TOTAL, &labels).increment(1);
}

/// Update active WebSocket connections gauge.
pub fn set_ws_active_connections(count: i64) {
    gauge!(names::WS_CONNECTIONS_ACTIVE).set(count as f64);
}

/// Record a frame pushed to a WebSocket client.
pub fn record_ws_message_sent(topic: &str) {
    let labels = [("topic", topic.to_string())];
    counter!(names::WS_MESSAGES_SENT, &labels).increment(1);
}

/// Record frames a lagging client never received.
pub fn record_ws_messages_dropped(count: u64) {
    counter!(names::WS_MESSAGES_DROPPED).increment(count);
}

static GIG_ID: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"/gigs/[A-Za-z0-9_-]+").ok());

/// Sanitize path for metrics labels (collapse gig ids).
fn sanitize_path(path: &str) -> String {
    let Some(re) = GIG_ID.as_ref() else {
        return path.to_string();
    };

    re.replace_all(path, |caps: &regex_lite::Captures<'_>| {
        if &caps[0] == "/gigs/search" {
            caps[0].to_string()
        } else {
            "/gigs/:id".to_string()
        }
    })
    .into_owned()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(sanitize_path("/api/gigs/abc123"), "/api/gigs/:id");
        assert_eq!(sanitize_path("/api/gigs/abc123/status"), "/api/gigs/:id/status");
        assert_eq!(sanitize_path("/api/gigs/search"), "/api/gigs/search");
        assert_eq!(sanitize_path("/api/gigs"), "/api/gigs");
    }
}
