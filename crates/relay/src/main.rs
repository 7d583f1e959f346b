//! Alert relay service binary.
//!
//! Listens for alert webhooks and records them in the configured record
//! store; optionally runs the retention purge task.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use relay::{
    config::Config,
    purge::{self, PurgeSettings},
    server::{self, AppState},
    AlertWriter, AssetResolver, StoreClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("relay=info".parse()?))
        .init();

    info!("Starting alert relay service...");

    let config = Config::from_env().context("Invalid configuration")?;

    let store = StoreClient::with_base_url(&config.store_token, &config.store_api_url)
        .context("Failed to build record store client")?;
    let assets = AssetResolver::new(store.clone(), &config.assets_database_id);
    let writer = AlertWriter::new(store.clone(), &config.alerts_database_id, assets);

    let cancel = CancellationToken::new();
    let mut purge_task = None;
    if let Some(purge_config) = &config.purge {
        info!(age_days = purge_config.age_days, "Alert auto-purge enabled");
        let settings = PurgeSettings {
            database_id: config.alerts_database_id.clone(),
            age_days: purge_config.age_days,
            interval: purge_config.interval,
        };
        purge_task = Some(tokio::spawn(purge::run_purge_loop(
            store,
            settings,
            cancel.clone(),
        )));
    } else {
        info!("Alert auto-purge disabled");
    }

    let app = server::build_router(AppState { writer });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(port = config.port, "Listening for alert webhooks");

    let shutdown_cancel = cancel.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
            shutdown_cancel.cancel();
        })
        .await
        .context("Server error")?;

    cancel.cancel();
    if let Some(task) = purge_task {
        let _ = task.await;
    }

    info!("Alert relay service stopped");
    Ok(())
}
