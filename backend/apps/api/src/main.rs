//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors. Request-level errors are
//! rendered by the accounts crate.

use accounts::{
    AccountsConfig, IdleTimeoutPolicy, LocalFileStore, PgAccountsRepository, SessionSweeper,
    accounts_router,
};
use anyhow::Context;
use axum::{
    Router, http,
    http::{Method, header},
};
use base64::Engine;
use base64::engine::general_purpose;
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,accounts=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let accounts_config = load_accounts_config()?;
    let repo = PgAccountsRepository::new(pool.clone());

    // Startup cleanup: expired sessions and orphaned active-session records
    // Errors here should not prevent server startup
    let sweeper = SessionSweeper::new(Arc::new(repo.clone()));
    match sweeper.sweep().await {
        Ok(report) => {
            tracing::info!(
                sessions_deleted = report.expired_sessions,
                active_sessions_deleted = report.stale_active_sessions,
                "Session cleanup completed"
            );
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Session cleanup failed, continuing anyway"
            );
        }
    }
    sweeper.spawn(accounts_config.sweep_interval);

    let files = LocalFileStore::new(accounts_config.media_root.clone());
    tracing::info!(media_root = %files.root().display(), "Document storage ready");

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest("/api", accounts_router(repo, files, accounts_config))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:31113".to_string())
        .parse()
        .context("BIND_ADDR must be a socket address")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Build the accounts configuration from the environment
fn load_accounts_config() -> anyhow::Result<AccountsConfig> {
    let mut config = if cfg!(debug_assertions) {
        AccountsConfig::development()
    } else {
        // In production, load secret from environment
        let secret_b64 =
            env::var("SESSION_SECRET").context("SESSION_SECRET must be set in production")?;
        let secret_bytes = Engine::decode(&general_purpose::STANDARD, secret_b64.trim())?;
        let session_secret: [u8; 32] = secret_bytes
            .try_into()
            .map_err(|_| anyhow::anyhow!("SESSION_SECRET must decode to 32 bytes"))?;
        AccountsConfig {
            session_secret,
            ..AccountsConfig::default()
        }
    };

    if let Ok(raw) = env::var("SESSION_IDLE_TIMEOUT") {
        let secs: u64 = raw
            .trim()
            .parse()
            .context("SESSION_IDLE_TIMEOUT must be a number of seconds")?;
        config.idle = IdleTimeoutPolicy::with_timeout(Duration::from_secs(secs));
    }

    if let Ok(media_root) = env::var("MEDIA_ROOT") {
        config.media_root = media_root.into();
    }

    if let Ok(raw) = env::var("COOKIE_SECURE") {
        config.cookie_secure = matches!(raw.trim(), "1" | "true" | "yes");
    }

    tracing::info!(
        idle_timeout_secs = config.idle.timeout.as_secs(),
        cookie_secure = config.cookie_secure,
        "Accounts configuration loaded"
    );

    Ok(config)
}
