//! GitHub OAuth client
//!
//! Builds the authorization URL, exchanges authorization codes for access
//! tokens and fetches the authenticated user's profile.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;

use crate::config::GitHubOAuthConfig;
use crate::error::AppError;
use crate::metrics::{GITHUB_REQUEST_DURATION_SECONDS, GITHUB_REQUESTS_TOTAL};

/// Scopes requested on every authorization
pub const GITHUB_SCOPES: [&str; 2] = ["read:user", "repo"];

/// State value sent with every authorization request.
///
/// This is a fixed placeholder, not a per-request nonce, and it is never
/// verified on callback. It offers no CSRF protection.
pub const AUTHORIZE_STATE: &str = "state-token";

/// User-Agent sent to GitHub, which rejects API requests without one
const USER_AGENT: &str = concat!("GitVal/", env!("CARGO_PKG_VERSION"));

/// Authenticated user profile, passed through exactly as GitHub returns it
pub type UserProfile = serde_json::Map<String, serde_json::Value>;

/// Media types whose token bodies are form-encoded rather than JSON
const FORM_MEDIA_TYPES: [&str; 2] = ["application/x-www-form-urlencoded", "text/plain"];

/// Access token returned by the token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Token endpoint body
///
/// GitHub answers rejected codes with `200 OK` and an `error` field, so
/// both shapes have to be accepted before deciding.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TokenResponse {
    Error {
        error: String,
        #[serde(default)]
        error_description: Option<String>,
    },
    Token(AccessToken),
}

/// GitHub OAuth client
///
/// Immutable after construction; share it behind an `Arc`.
pub struct GitHubClient {
    config: GitHubOAuthConfig,
    http: reqwest::Client,
}

impl GitHubClient {
    /// Create a client with its own connection pool
    ///
    /// Every outbound request is bounded by `config.timeout_seconds`.
    pub fn new(config: GitHubOAuthConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(e.into()))?;

        Ok(Self { config, http })
    }

    /// Build the URL the browser is redirected to for user consent
    ///
    /// Parameters are appended in key order; `redirect_uri` is omitted when
    /// no callback URL is configured.
    pub fn authorize_url(&self, state: &str) -> Result<url::Url, AppError> {
        let mut url = url::Url::parse(&self.config.authorize_url)
            .map_err(|e| AppError::Config(format!("github.authorize_url: {e}")))?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("access_type", "online")
                .append_pair("client_id", &self.config.client_id);
            if !self.config.callback_url.is_empty() {
                query.append_pair("redirect_uri", &self.config.callback_url);
            }
            query
                .append_pair("response_type", "code")
                .append_pair("scope", &GITHUB_SCOPES.join(" "))
                .append_pair("state", state);
        }

        Ok(url)
    }

    /// Exchange an authorization code for an access token
    pub async fn exchange_code(&self, code: &str) -> Result<AccessToken, AppError> {
        let _timer = GITHUB_REQUEST_DURATION_SECONDS
            .with_label_values(&["token"])
            .start_timer();

        let result = self.request_token(code).await;
        record_outcome("token", result.is_ok());
        result
    }

    async fn request_token(&self, code: &str) -> Result<AccessToken, AppError> {
        let mut form = vec![
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
        ];
        if !self.config.callback_url.is_empty() {
            form.push(("redirect_uri", self.config.callback_url.as_str()));
        }

        let response = self
            .http
            .post(&self.config.token_url)
            .header(ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::TokenExchange(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::TokenExchange(format!(
                "token endpoint returned {status}"
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::TokenExchange(e.to_string()))?;

        match parse_token_body(&content_type, &bytes)? {
            TokenResponse::Error {
                error,
                error_description,
            } => Err(AppError::TokenExchange(match error_description {
                Some(description) => format!("{error}: {description}"),
                None => error,
            })),
            TokenResponse::Token(token) if token.access_token.is_empty() => Err(
                AppError::TokenExchange("token endpoint returned an empty access token".to_string()),
            ),
            TokenResponse::Token(token) => Ok(token),
        }
    }

    /// Fetch the profile of the user the access token belongs to
    ///
    /// A non-success status is logged but its body is still decoded and
    /// returned.
    ///
    /// A JSON `null` body yields `None`.
    pub async fn fetch_user(&self, token: &AccessToken) -> Result<Option<UserProfile>, AppError> {
        let _timer = GITHUB_REQUEST_DURATION_SECONDS
            .with_label_values(&["user"])
            .start_timer();

        let result = self.request_user(token).await;
        record_outcome("user", result.is_ok());
        result
    }

    async fn request_user(&self, token: &AccessToken) -> Result<Option<UserProfile>, AppError> {
        let response = self
            .http
            .get(&self.config.user_url)
            .bearer_auth(&token.access_token)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "GitHub user endpoint returned a non-success status");
        }

        // `bytes()` takes the response by value, so it is released on every path.
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::ParseUser(e.to_string()))?;

        parse_user_body(&bytes)
    }
}

/// Decode a token endpoint body according to its media type
///
/// Form bodies are GitHub's classic format; anything else is read as JSON.
fn parse_token_body(content_type: &str, body: &[u8]) -> Result<TokenResponse, AppError> {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if !FORM_MEDIA_TYPES.contains(&media_type.as_str()) {
        return serde_json::from_slice(body).map_err(|e| AppError::TokenExchange(e.to_string()));
    }

    let mut access_token = String::new();
    let mut token_type = String::new();
    let mut scope = None;
    let mut error = None;
    let mut error_description = None;
    for (key, value) in url::form_urlencoded::parse(body) {
        match key.as_ref() {
            "access_token" => access_token = value.into_owned(),
            "token_type" => token_type = value.into_owned(),
            "scope" => scope = Some(value.into_owned()),
            "error" if !value.is_empty() => error = Some(value.into_owned()),
            "error_description" => error_description = Some(value.into_owned()),
            _ => {}
        }
    }

    Ok(match error {
        Some(error) => TokenResponse::Error {
            error,
            error_description,
        },
        None => TokenResponse::Token(AccessToken {
            access_token,
            token_type,
            scope,
        }),
    })
}

/// Decode the first JSON value of a profile body
///
/// Content after the first value is ignored. `null` is accepted; arrays,
/// scalars and empty bodies are not.
fn parse_user_body(body: &[u8]) -> Result<Option<UserProfile>, AppError> {
    serde_json::Deserializer::from_slice(body)
        .into_iter::<Option<UserProfile>>()
        .next()
        .ok_or_else(|| AppError::ParseUser("empty body".to_string()))?
        .map_err(|e| AppError::ParseUser(e.to_string()))
}

fn record_outcome(operation: &str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    GITHUB_REQUESTS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
}
