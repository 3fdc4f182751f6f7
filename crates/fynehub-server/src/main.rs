//! Fyne Creator Hub - server entry point

use anyhow::Result;
use fynehub_common::config::Config;
use fynehub_storage::db::DatabasePool;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    info!("Starting Fyne Creator Hub...");

    let config = Config::load()?;

    let db_pool = DatabasePool::new(&config.database).await?;
    info!("Database connection established");

    db_pool.migrate().await?;
    info!("Database migrations completed");

    let addr = format!("{}:{}", config.api.host, config.api.port);
    let app = fynehub_api::create_router(db_pool, config);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Fyne Creator Hub shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,fynehub=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_level(true))
        .with(filter)
        .init();
}
