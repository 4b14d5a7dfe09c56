//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, core::Collector};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("gitval_http_requests_total", "Total number of HTTP requests"),
        &["method", "endpoint", "status"]
    ).expect("metric can be created");

    // GitHub Metrics
    pub static ref GITHUB_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("gitval_github_requests_total", "Total number of outbound GitHub requests"),
        &["operation", "outcome"]
    ).expect("metric can be created");
    pub static ref GITHUB_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "gitval_github_request_duration_seconds",
            "Outbound GitHub request duration in seconds"
        ).buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["operation"]
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("gitval_errors_total", "Total number of error responses"),
        &["error_type"]
    ).expect("metric can be created");
}

/// Initialize metrics registry.
///
/// Safe to call more than once; collectors that are already registered
/// are skipped.
pub fn init_metrics() {
    register("gitval_http_requests_total", HTTP_REQUESTS_TOTAL.clone());
    register("gitval_github_requests_total", GITHUB_REQUESTS_TOTAL.clone());
    register(
        "gitval_github_request_duration_seconds",
        GITHUB_REQUEST_DURATION_SECONDS.clone(),
    );
    register("gitval_errors_total", ERRORS_TOTAL.clone());

    tracing::debug!("Metrics registry initialized");
}

fn register<C>(name: &str, collector: C)
where
    C: Collector + 'static,
{
    match REGISTRY.register(Box::new(collector)) {
        Ok(()) => {}
        Err(prometheus::Error::AlreadyReg) => {
            tracing::debug!(metric = name, "Metric already registered");
        }
        Err(error) => {
            tracing::error!(metric = name, %error, "Failed to register metric");
        }
    }
}
