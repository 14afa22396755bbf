//! # autoflowd — autoflow daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialise `tracing` from the configured filter
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct the stores, the outbound transport and the engine
//! - Build the axum router and serve it
//! - Handle graceful shutdown (Ctrl-C)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use anyhow::Context;
use autoflow_adapter_http_axum::router;
use autoflow_adapter_http_axum::state::AppState;
use autoflow_adapter_storage_sqlite_sqlx::{
    SqliteAutomationLogStore, SqliteAutomationRepository, SqliteRecordStore,
};
use autoflow_adapter_transport::NetworkTransport;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Config;

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "cannot listen for shutdown signal");
    }
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("cannot load configuration")?;
    init_tracing(&config.logging.filter);

    // Database
    let db = autoflow_adapter_storage_sqlite_sqlx::Config {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await
    .context("cannot open database")?;
    let pool = db.pool().clone();

    // Outbound transport
    let smtp = config.smtp_config();
    let transport = NetworkTransport::new(config.http_config(), smtp.as_ref())
        .context("cannot build outbound transport")?;
    if !transport.email_enabled() {
        tracing::warn!("no [smtp] section, send_email actions will fail");
    }

    // Engine + HTTP
    let state = AppState::new(
        SqliteAutomationRepository::new(pool.clone()),
        SqliteAutomationLogStore::new(pool.clone()),
        SqliteRecordStore::new(pool),
        transport,
        config.engine_config(),
    );
    let app = router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("cannot bind {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "autoflowd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
