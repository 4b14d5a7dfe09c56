//! GitVal binary entry point

use gitval::{AppState, auth, config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application entry point
///
/// # Setup
/// 1. Load `.env` if present
/// 2. Load configuration from file and environment
/// 3. Initialize tracing/logging from the logging configuration
/// 4. Initialize AppState
/// 5. Build Axum router
/// 6. Start HTTP server
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load .env before anything reads the environment
    let dotenv = dotenvy::dotenv();

    // 2. Load configuration
    let config = config::AppConfig::load()?;

    // 3. Initialize tracing/logging
    init_tracing(&config.logging);

    match dotenv {
        Ok(path) => tracing::info!(path = %path.display(), "Loaded .env file"),
        Err(error) if error.not_found() => tracing::info!("No .env file found"),
        Err(error) => tracing::warn!(%error, "Failed to load .env file"),
    }

    gitval::metrics::init_metrics();

    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        callback_url = %config.github.callback_url,
        "Configuration loaded"
    );
    if !config.github.has_credentials() {
        tracing::warn!(
            client_id_set = !config.github.client_id.is_empty(),
            client_secret_set = !config.github.client_secret.is_empty(),
            "GitHub OAuth credentials are incomplete; logins will fail"
        );
    }
    tracing::warn!(
        state = auth::AUTHORIZE_STATE,
        "OAuth state parameter is a fixed placeholder and is not verified; it provides no CSRF protection"
    );

    // 4. Initialize application state
    let state = AppState::new(&config)?;

    // 5. Build Axum router
    let app = gitval::build_router(state);

    // 6. Start HTTP server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🚀 Server running on http://localhost:{}", config.server.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over `logging.level`.
fn init_tracing(logging: &config::LoggingConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(logging.default_directives()));

    if logging.format == "json" {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Resolve when Ctrl-C or SIGTERM is received
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!(%error, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
