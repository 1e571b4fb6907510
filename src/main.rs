use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use desirability_form_api::config::Config;
use desirability_form_api::db::Database;
use desirability_form_api::db_storage::FormResponseStorage;
use desirability_form_api::handlers::AppState;
use desirability_form_api::router::build_router;

/// Main entry point for the application.
///
/// Initializes logging, loads the configuration, connects to Postgres (an
/// unreachable store is fatal), then serves `/submit` and `/health`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "desirability_form_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let db = Database::new(&config).await.with_context(|| {
        format!(
            "Database unreachable at {}",
            config.redacted_database_url()
        )
    })?;
    tracing::info!("Database connection pool established");

    let state = AppState::new(Arc::new(FormResponseStorage::new(db.pool.clone())));
    let app = build_router(state, config.max_body_bytes);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
