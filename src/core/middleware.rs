//! HTTP middleware for request IDs, metrics and request logging.

use crate::core::error_types::ErrorKind;
use crate::core::logging::{
    generate_request_id, sanitize_request_id, REQUEST_ID, REQUEST_ID_HEADER,
};
use crate::core::metrics::get_metrics;
use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// Known client patterns for User-Agent mapping.
/// Order matters - more specific patterns should come first.
const CLIENT_PATTERNS: &[(&str, &str)] = &[
    ("Edg/", "edge"),
    ("Firefox/", "firefox"),
    ("Chrome/", "chrome"),
    ("Safari/", "safari"),
    ("PostmanRuntime", "postman"),
    ("insomnia", "insomnia"),
    ("python-requests", "python-requests"),
    ("python-httpx", "python-httpx"),
    ("axios", "axios"),
    ("node-fetch", "node-fetch"),
    ("curl", "curl"),
    ("wget", "wget"),
    ("Mozilla", "browser"),
];

/// Extract normalized client name from User-Agent header
pub fn extract_client(headers: &HeaderMap) -> String {
    let raw = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if raw.is_empty() {
        return "unknown".to_string();
    }

    for (pattern, client_name) in CLIENT_PATTERNS {
        if raw.contains(pattern) {
            return client_name.to_string();
        }
    }

    // Fallback: first token, truncated to 30 chars
    let first_token = raw
        .split(|c: char| c == ' ' || c == '/')
        .next()
        .unwrap_or(raw);

    let cleaned: String = first_token
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_' || *c == '.')
        .take(30)
        .collect();

    if cleaned.is_empty() {
        "other".to_string()
    } else {
        cleaned
    }
}

/// Assign a request ID (propagated from `x-request-id` or freshly generated),
/// scope it for the rest of the request, and echo it on the response.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(sanitize_request_id)
        .unwrap_or_else(generate_request_id);

    let mut response = REQUEST_ID
        .scope(request_id.clone(), next.run(request))
        .await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Middleware for tracking request metrics.
pub struct MetricsMiddleware;

impl MetricsMiddleware {
    /// Track metrics for incoming requests.
    ///
    /// This middleware:
    /// - Increments active request counter
    /// - Measures request duration
    /// - Records request count by status code and relay error kind
    /// - Logs request details
    pub async fn track_metrics(request: Request, next: Next) -> Response {
        let endpoint = request.uri().path().to_string();
        let method = request.method().to_string();
        let client = extract_client(request.headers());

        // Skip metrics endpoint itself to avoid recursion
        if endpoint == "/metrics" {
            return next.run(request).await;
        }

        let metrics = get_metrics();
        let _active = ActiveRequestGuard::new(&endpoint);

        let start = Instant::now();
        let response = next.run(request).await;
        let duration = start.elapsed().as_secs_f64();

        let status_code = response.status().as_u16().to_string();
        let error_kind = response.extensions().get::<ErrorKind>().copied();
        let kind_label = error_kind.map(ErrorKind::as_str).unwrap_or("none");

        metrics
            .request_count
            .with_label_values(&[&method, &endpoint, &status_code, kind_label])
            .inc();
        metrics
            .request_duration
            .with_label_values(&[&method, &endpoint])
            .observe(duration);

        match error_kind {
            Some(kind) => tracing::warn!(
                "{} {} - status={} kind={} transient={} client={} duration={:.3}s",
                method,
                endpoint,
                status_code,
                kind,
                kind.is_transient(),
                client,
                duration
            ),
            None => tracing::info!(
                "{} {} - status={} client={} duration={:.3}s",
                method,
                endpoint,
                status_code,
                client,
                duration
            ),
        }

        response
    }
}

/// Holds one slot of the `active_requests` gauge.
///
/// Released on drop, so a request whose future is dropped mid-flight
/// (client disconnect) still leaves the gauge balanced.
struct ActiveRequestGuard {
    gauge: prometheus::Gauge,
}

impl ActiveRequestGuard {
    fn new(endpoint: &str) -> Self {
        let gauge = get_metrics()
            .active_requests
            .with_label_values(&[endpoint]);
        gauge.inc();
        Self { gauge }
    }
}

impl Drop for ActiveRequestGuard {
    fn drop(&mut self) {
        self.gauge.dec();
    }
}
