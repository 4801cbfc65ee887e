//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request-level errors are
//! `classroom::ClassroomError`.

mod config;

use std::sync::Arc;

use axum::Router;
use classroom::application::SessionManager;
use classroom::{MIGRATOR, SqliteClassroomRepository, classroom_router};
use sqlx::sqlite::SqlitePoolOptions;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,classroom=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env()?;
    tracing::debug!(config = ?config, "Loaded configuration");

    // Database connection
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations completed");

    let repo = SqliteClassroomRepository::new(pool);

    // Startup cleanup: remove expired sessions
    // Errors here should not prevent server startup
    let sessions = SessionManager::new(Arc::new(repo.clone()), Arc::new(config.classroom.clone()));
    if let Err(e) = sessions.cleanup_expired().await {
        tracing::warn!(
            error = %e,
            "Session cleanup failed, continuing anyway"
        );
    }

    // Build router
    let app = Router::new()
        .merge(classroom_router(repo, config.classroom))
        .layer(TraceLayer::new_for_http());

    // Start server
    tracing::info!("Listening on {}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
