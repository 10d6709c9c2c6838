//! Prometheus metrics for monitoring the relay.
//!
//! This module provides a centralized metrics registry for tracking inbound
//! requests, upstream call latency and outcomes, and abandoned calls.

use prometheus::{
    register_gauge_vec, register_histogram_vec, register_int_counter, register_int_counter_vec,
    GaugeVec, HistogramVec, IntCounter, IntCounterVec,
};
use std::sync::OnceLock;

/// Container for all application metrics.
pub struct Metrics {
    /// Total number of requests by method, endpoint, status, and error kind
    pub request_count: IntCounterVec,

    /// Request duration histogram in seconds
    pub request_duration: HistogramVec,

    /// Number of currently active requests by endpoint
    pub active_requests: GaugeVec,

    /// Upstream call latency in seconds by model and outcome
    pub upstream_latency: HistogramVec,

    /// Upstream calls by model and outcome (success, timeout, transport, status, malformed)
    pub upstream_calls: IntCounterVec,

    /// Upstream calls abandoned because the inbound request went away
    pub upstream_abandoned: IntCounter,
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Initialize the metrics registry.
///
/// This should be called once at application startup. Subsequent calls will
/// return the same instance.
///
/// # Examples
///
/// ```no_run
/// use netassist_relay::core::metrics::init_metrics;
///
/// let metrics = init_metrics();
/// metrics.request_count.with_label_values(&["POST", "/api/gemini", "200", "none"]).inc();
/// ```
pub fn init_metrics() -> &'static Metrics {
    METRICS.get_or_init(|| {
        let request_count = register_int_counter_vec!(
            "netassist_relay_requests_total",
            "Total number of requests",
            &["method", "endpoint", "status_code", "error_kind"]
        )
        .expect("Failed to register request_count metric");

        let request_duration = register_histogram_vec!(
            "netassist_relay_request_duration_seconds",
            "Request duration in seconds",
            &["method", "endpoint"],
            vec![0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]
        )
        .expect("Failed to register request_duration metric");

        let active_requests = register_gauge_vec!(
            "netassist_relay_active_requests",
            "Number of active requests",
            &["endpoint"]
        )
        .expect("Failed to register active_requests metric");

        let upstream_latency = register_histogram_vec!(
            "netassist_relay_upstream_latency_seconds",
            "Upstream provider call latency in seconds",
            &["model", "outcome"],
            vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]
        )
        .expect("Failed to register upstream_latency metric");

        let upstream_calls = register_int_counter_vec!(
            "netassist_relay_upstream_calls_total",
            "Total number of upstream provider calls",
            &["model", "outcome"]
        )
        .expect("Failed to register upstream_calls metric");

        let upstream_abandoned = register_int_counter!(
            "netassist_relay_upstream_abandoned_total",
            "Upstream calls abandoned before completion"
        )
        .expect("Failed to register upstream_abandoned metric");

        Metrics {
            request_count,
            request_duration,
            active_requests,
            upstream_latency,
            upstream_calls,
            upstream_abandoned,
        }
    })
}

/// Get the global metrics instance, initializing it on first use.
pub fn get_metrics() -> &'static Metrics {
    init_metrics()
}

/// Record the outcome of one upstream call.
pub fn record_upstream_call(model: &str, outcome: &str, elapsed_secs: f64) {
    let metrics = get_metrics();
    metrics
        .upstream_calls
        .with_label_values(&[model, outcome])
        .inc();
    metrics
        .upstream_latency
        .with_label_values(&[model, outcome])
        .observe(elapsed_secs);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_initialization() {
        let metrics = init_metrics();
        let metrics2 = get_metrics();
        assert!(std::ptr::eq(metrics, metrics2));
    }

    #[test]
    fn test_request_count_metric() {
        let metrics = init_metrics();
        let labels = ["POST", "/unit-test", "429", "rate-limited"];

        let initial = metrics.request_count.with_label_values(&labels).get();
        metrics.request_count.with_label_values(&labels).inc();
        let after = metrics.request_count.with_label_values(&labels).get();

        assert_eq!(after, initial + 1);
    }

    #[test]
    fn test_record_upstream_call() {
        let metrics = init_metrics();
        let initial = metrics
            .upstream_calls
            .with_label_values(&["unit-model", "success"])
            .get();

        record_upstream_call("unit-model", "success", 0.25);

        let after = metrics
            .upstream_calls
            .with_label_values(&["unit-model", "success"])
            .get();
        assert_eq!(after, initial + 1);
        assert!(
            metrics
                .upstream_latency
                .with_label_values(&["unit-model", "success"])
                .get_sample_count()
                >= 1
        );
    }

    #[test]
    fn test_active_requests_metric() {
        let metrics = init_metrics();
        let gauge = metrics.active_requests.with_label_values(&["/unit-active"]);

        let initial = gauge.get();
        gauge.inc();
        assert_eq!(gauge.get(), initial + 1.0);
        gauge.dec();
        assert_eq!(gauge.get(), initial);
    }
}
