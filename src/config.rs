//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration files (config/default.toml, config/local.toml)
//! 3. Environment variables (GITVAL__*)
//! 4. The conventional GitHub variables (GITHUB_CLIENT_ID, GITHUB_CLIENT_SECRET,
//!    GITHUB_CALLBACK_URL)

use serde::Deserialize;

/// Default GitHub authorization endpoint
pub const GITHUB_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
/// Default GitHub token endpoint
pub const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
/// Default GitHub authenticated-user endpoint
pub const GITHUB_USER_URL: &str = "https://api.github.com/user";

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub github: GitHubOAuthConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (default: 3000)
    pub port: u16,
}

/// GitHub OAuth client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Redirect URI registered with the GitHub OAuth app
    pub callback_url: String,
    pub authorize_url: String,
    pub token_url: String,
    pub user_url: String,
    /// Total timeout for each outbound GitHub request
    pub timeout_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honoured.
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("github.client_id", "")?
            .set_default("github.client_secret", "")?
            .set_default("github.callback_url", "")?
            .set_default("github.authorize_url", GITHUB_AUTHORIZE_URL)?
            .set_default("github.token_url", GITHUB_TOKEN_URL)?
            .set_default("github.user_url", GITHUB_USER_URL)?
            .set_default("github.timeout_seconds", 10)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("GITVAL")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("github.client_id", std::env::var("GITHUB_CLIENT_ID").ok())?
            .set_override_option(
                "github.client_secret",
                std::env::var("GITHUB_CLIENT_SECRET").ok(),
            )?
            .set_override_option(
                "github.callback_url",
                std::env::var("GITHUB_CALLBACK_URL").ok(),
            )?
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> Result<(), crate::error::AppError> {
        let github = &self.github;

        if github.timeout_seconds == 0 {
            return Err(crate::error::AppError::Config(
                "github.timeout_seconds must be greater than 0".to_string(),
            ));
        }

        for (key, value) in [
            ("github.authorize_url", &github.authorize_url),
            ("github.token_url", &github.token_url),
            ("github.user_url", &github.user_url),
        ] {
            url::Url::parse(value).map_err(|e| {
                crate::error::AppError::Config(format!("{key} is not a valid URL: {e}"))
            })?;
        }

        if !github.callback_url.is_empty() {
            url::Url::parse(&github.callback_url).map_err(|e| {
                crate::error::AppError::Config(format!(
                    "github.callback_url is not a valid URL: {e}"
                ))
            })?;
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(crate::error::AppError::Config(format!(
                "logging.format must be \"pretty\" or \"json\", got {:?}",
                self.logging.format
            )));
        }

        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(crate::error::AppError::Config(format!(
                "logging.level must be one of trace, debug, info, warn, error, got {:?}",
                self.logging.level
            )));
        }

        Ok(())
    }
}

impl GitHubOAuthConfig {
    /// Both client id and secret are set
    ///
    /// Missing credentials do not stop startup; token exchanges will fail.
    pub fn has_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

impl LoggingConfig {
    /// Default `EnvFilter` directives when `RUST_LOG` is unset
    pub fn default_directives(&self) -> String {
        format!("gitval={},tower_http=debug", self.level.to_ascii_lowercase())
    }
}
