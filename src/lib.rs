//! GitVal - API backend with GitHub OAuth login
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - GET /                    welcome message                  │
//! │  - GET /api/auth/github     redirect to GitHub               │
//! │  - GET /api/auth/callback   code exchange + profile lookup   │
//! │  - GET /health, /metrics                                     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     GitHub OAuth Client                      │
//! │  - github.com/login/oauth (authorize, access_token)         │
//! │  - api.github.com/user                                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: Welcome and metrics handlers
//! - `auth`: GitHub OAuth flow
//! - `config`: Configuration management
//! - `error`: Error types
//! - `metrics`: Prometheus instruments

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;

use std::sync::Arc;

/// Application state shared across all handlers
///
/// Cloned for each request; everything inside is immutable.
#[derive(Clone)]
pub struct AppState {
    /// GitHub OAuth client, holding its own copy of the GitHub configuration
    pub github: Arc<auth::GitHubClient>,
}

impl AppState {
    /// Initialize application state
    ///
    /// # Errors
    /// Returns error if the outbound HTTP client cannot be built
    pub fn new(config: &config::AppConfig) -> Result<Self, error::AppError> {
        let github = auth::GitHubClient::new(config.github.clone())?;

        tracing::debug!(
            token_url = %config.github.token_url,
            user_url = %config.github.user_url,
            "GitHub client initialized"
        );

        Ok(Self {
            github: Arc::new(github),
        })
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::{Router, middleware};
    use tower_http::{cors::CorsLayer, trace::TraceLayer};

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .merge(api::welcome_router())
        .merge(auth::auth_router())
        .with_state(state)
        .merge(api::metrics_router())
        .layer(middleware::from_fn(api::track_http_requests))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health_check() -> &'static str {
    "OK"
}
