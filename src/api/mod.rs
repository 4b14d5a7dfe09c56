//! API layer
//!
//! HTTP handlers for:
//! - Welcome message
//! - Metrics (Prometheus)

pub mod metrics;
mod welcome;

pub use metrics::{metrics_router, track_http_requests};
pub use welcome::{WELCOME_MESSAGE, welcome_router};
