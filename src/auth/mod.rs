//! GitHub OAuth authentication
//!
//! Handles:
//! - GitHub OAuth flow
//! - Token exchange and profile lookup against GitHub

pub mod github;
mod oauth;

pub use github::{AUTHORIZE_STATE, AccessToken, GITHUB_SCOPES, GitHubClient, UserProfile};
pub use oauth::auth_router;
