//! Common test utilities for E2E tests

use std::time::Duration;

use axum::{
    Router,
    http::{
        HeaderMap, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
    routing::{get, post},
};
use gitval::{AppState, config};
use tokio::net::TcpListener;

/// How the stub token endpoint answers
#[derive(Clone)]
pub enum TokenBehavior {
    /// 200 with `{"access_token": <token>, ...}`
    Token(&'static str),
    /// 200 with a form-encoded body under the given content type
    Form(&'static str, &'static str),
    /// Error status with an OAuth error body
    Status(StatusCode),
    /// 200 with an OAuth error body, as GitHub does for rejected codes
    OAuthError,
}

/// How the stub user endpoint answers
#[derive(Clone)]
pub enum UserBehavior {
    /// 200 with the given body and JSON content type
    Json(&'static str),
    /// 200 with a non-JSON body
    Text(&'static str),
    /// Given status with a JSON body
    Status(StatusCode, &'static str),
    /// 200 with a JSON body, sent only after the delay
    Slow(Duration, &'static str),
}

/// Outbound request timeout used by every test server, in seconds
pub const GITHUB_TIMEOUT_SECONDS: u64 = 1;

/// Stub GitHub serving the token and user endpoints
pub struct GitHubStub {
    pub addr: String,
}

impl GitHubStub {
    pub async fn start(token: TokenBehavior, user: UserBehavior) -> Self {
        let app = Router::new()
            .route(
                "/login/oauth/access_token",
                post(move || token_endpoint(token.clone())),
            )
            .route(
                "/user",
                get(move |headers: HeaderMap| user_endpoint(user.clone(), headers)),
            );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = format!("http://{}", listener.local_addr().unwrap());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr }
    }

    pub fn token_url(&self) -> String {
        format!("{}/login/oauth/access_token", self.addr)
    }

    pub fn user_url(&self) -> String {
        format!("{}/user", self.addr)
    }
}

async fn token_endpoint(behavior: TokenBehavior) -> Response {
    match behavior {
        TokenBehavior::Token(token) => axum::Json(serde_json::json!({
            "access_token": token,
            "token_type": "bearer",
            "scope": "read:user,repo",
        }))
        .into_response(),
        TokenBehavior::Form(content_type, body) => {
            ([(CONTENT_TYPE, content_type)], body).into_response()
        }
        TokenBehavior::Status(status) => (
            status,
            axum::Json(serde_json::json!({ "error": "server_error" })),
        )
            .into_response(),
        TokenBehavior::OAuthError => axum::Json(serde_json::json!({
            "error": "bad_verification_code",
            "error_description": "The code passed is incorrect or expired.",
        }))
        .into_response(),
    }
}

async fn user_endpoint(behavior: UserBehavior, headers: HeaderMap) -> Response {
    let authorized = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("Bearer "));
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            axum::Json(serde_json::json!({ "message": "Requires authentication" })),
        )
            .into_response();
    }

    match behavior {
        UserBehavior::Json(body) => ([(CONTENT_TYPE, "application/json")], body).into_response(),
        UserBehavior::Text(body) => body.into_response(),
        UserBehavior::Status(status, body) => {
            (status, [(CONTENT_TYPE, "application/json")], body).into_response()
        }
        UserBehavior::Slow(delay, body) => {
            tokio::time::sleep(delay).await;
            ([(CONTENT_TYPE, "application/json")], body).into_response()
        }
    }
}

/// An address nothing listens on
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/user", addr)
}

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Test server pointing at the real GitHub endpoints
    ///
    /// Suitable for tests that never reach the token exchange.
    pub async fn new() -> Self {
        Self::with_endpoints(
            config::GITHUB_TOKEN_URL.to_string(),
            config::GITHUB_USER_URL.to_string(),
        )
        .await
    }

    /// Test server talking to a stub GitHub
    pub async fn with_github(stub: &GitHubStub) -> Self {
        Self::with_endpoints(stub.token_url(), stub.user_url()).await
    }

    /// Test server with explicit token and user endpoints
    pub async fn with_endpoints(token_url: String, user_url: String) -> Self {
        gitval::metrics::init_metrics();

        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
            },
            github: config::GitHubOAuthConfig {
                client_id: "test-client-id".to_string(),
                client_secret: "test-client-secret".to_string(),
                callback_url: "http://localhost:3000/api/auth/callback".to_string(),
                authorize_url: config::GITHUB_AUTHORIZE_URL.to_string(),
                token_url,
                user_url,
                timeout_seconds: GITHUB_TIMEOUT_SECONDS,
            },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        let state = AppState::new(&config).unwrap();

        // Redirects are inspected, not followed
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        let app = gitval::build_router(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr: addr_str,
            state,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// GET a path and decode the JSON body
    pub async fn get_json(&self, path: &str) -> (reqwest::StatusCode, serde_json::Value) {
        let response = self.client.get(self.url(path)).send().await.unwrap();
        let status = response.status();
        let body = response.json().await.unwrap();
        (status, body)
    }
}
