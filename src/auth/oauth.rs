//! GitHub OAuth flow
//!
//! Implements the OAuth 2.0 authorization code flow with GitHub.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header::LOCATION},
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;

use super::github::AUTHORIZE_STATE;
use crate::AppState;
use crate::error::AppError;

/// Create authentication router
///
/// Routes:
/// - GET /api/auth/github - Redirect to GitHub
/// - GET /api/auth/callback - OAuth callback
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/github", get(github_redirect))
        .route("/api/auth/callback", get(github_callback))
}

/// GET /api/auth/github
///
/// Redirects the user to the GitHub authorization page with `302 Found`.
async fn github_redirect(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let url = state.github.authorize_url(AUTHORIZE_STATE)?;

    Ok((StatusCode::FOUND, [(LOCATION, url.to_string())]))
}

/// Query parameters from GitHub callback
#[derive(Debug, Deserialize)]
struct GitHubCallbackQuery {
    /// Authorization code
    code: Option<String>,
    /// Echoed state; not verified
    state: Option<String>,
}

/// GET /api/auth/callback
///
/// Handles OAuth callback from GitHub.
///
/// # Steps
/// 1. Require a non-empty `code`
/// 2. Exchange code for access token
/// 3. Fetch user info from GitHub
/// 4. Return the token together with the profile
async fn github_callback(
    State(state): State<AppState>,
    Query(query): Query<GitHubCallbackQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let code = query
        .code
        .filter(|code| !code.is_empty())
        .ok_or(AppError::MissingCode)?;

    tracing::debug!(state = ?query.state, "Handling GitHub OAuth callback");

    let token = state.github.exchange_code(&code).await.inspect_err(|error| {
        tracing::warn!(%error, "GitHub token exchange failed");
    })?;

    let user = state.github.fetch_user(&token).await.inspect_err(|error| {
        tracing::warn!(%error, "GitHub user lookup failed");
    })?;

    tracing::info!(
        login = user
            .as_ref()
            .and_then(|user| user.get("login"))
            .and_then(|login| login.as_str())
            .unwrap_or_default(),
        token_type = %token.token_type,
        "GitHub login completed"
    );

    Ok(Json(serde_json::json!({
        "token": token.access_token,
        "user": user,
    })))
}
