//! Taskboard server: CRUD REST API for tasks behind a bearer-token gate.
//!
//! # Usage
//!
//! ```bash
//! # Run on default address 0.0.0.0:8080, tasks kept in memory
//! TASKBOARD_JWT_SECRET=... cargo run --bin taskboard-server
//!
//! # Persist tasks to a snapshot file
//! cargo run --bin taskboard-server -- --jwt-secret ... --data-file tasks.json
//! ```

use std::sync::Arc;

use clap::Parser;
use taskboard_server::api::{self, AppState};
use taskboard_server::auth::AuthGate;
use taskboard_server::config::{ServerCliArgs, ServerConfig};
use taskboard_server::store::TaskStore;

#[tokio::main]
async fn main() {
    let cli = ServerCliArgs::parse();

    let config = match ServerConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let store = match config.data_file.as_deref() {
        Some(path) => match TaskStore::open(path) {
            Ok(store) => store,
            Err(e) => {
                tracing::error!(error = %e, "failed to open task store");
                std::process::exit(1);
            }
        },
        None => {
            tracing::warn!("no data file configured; tasks are kept in memory only");
            TaskStore::new()
        }
    };
    let auth = AuthGate::new(&config.jwt_secret, config.jwt_audience.as_deref());
    let state = Arc::new(AppState::new(store, auth));

    tracing::info!(addr = %config.bind_addr, "starting taskboard server");

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
        tracing::info!("shutdown requested");
    };

    match api::start_server_with_shutdown(
        &config.bind_addr,
        state,
        &config.cors_origins,
        shutdown,
    )
    .await
    {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "taskboard server listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "taskboard server task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start taskboard server");
            std::process::exit(1);
        }
    }
}
