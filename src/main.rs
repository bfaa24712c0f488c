use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shelfmark::config::Config;
use shelfmark::AppState;

#[derive(Parser, Debug)]
#[command(name = "shelfmark")]
#[command(author, version, about = "A self-hosted book catalog and review service", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "shelfmark.toml")]
    config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config)?;

    // Initialize logging
    let log_level = cli
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .clone();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Shelfmark v{}", env!("CARGO_PKG_VERSION"));

    // Ensure data and upload directories exist
    shelfmark::utils::ensure_dir(&config.server.data_dir)?;
    shelfmark::utils::ensure_dir(&config.server.uploads_dir)?;

    // Initialize database
    let db = shelfmark::db::init(&config.server.data_dir).await?;

    // Seed the starter catalog (insert-if-absent, safe to rerun)
    shelfmark::db::seed_catalog(&db).await?;

    // Ensure the configured admin account exists
    shelfmark::api::auth::ensure_admin_user(
        &db,
        &config.auth.admin_email,
        &config.auth.admin_password,
    )
    .await?;

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), db.clone()));

    // API router, with uploaded avatars served back as static files
    let serve_uploads = ServeDir::new(&config.server.uploads_dir);
    let app = shelfmark::api::create_router(state)
        .nest_service("/uploads", serve_uploads)
        .layer(CorsLayer::permissive());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("API server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
