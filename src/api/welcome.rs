//! Welcome endpoint

use axum::{Json, Router, routing::get};

/// Message returned by `GET /`
pub const WELCOME_MESSAGE: &str = "Welcome to GitVal API!";

/// Create welcome router
///
/// Routes:
/// - GET /
pub fn welcome_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/", get(welcome))
}

/// GET /
async fn welcome() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": WELCOME_MESSAGE }))
}
