use anyhow::{Context as _, Result};
use clap::Args;
use freightdesk_config::AppConfig;
use freightdesk_server::{serve as serve_http, shutdown_signal, AppState};
use freightdesk_store::catalog::ShipmentCatalog;
use freightdesk_store::{paths, Store};
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Overrides `server.host` from the config file
    #[arg(long)]
    pub host: Option<String>,
    /// Overrides `server.port` from the config file
    #[arg(long)]
    pub port: Option<u16>,
}

pub fn serve(db_path: Option<PathBuf>, config: &AppConfig, args: ServeArgs) -> Result<()> {
    let db_path = paths::resolve_db_path(db_path).with_context(|| "resolve database path")?;
    let store = Store::open(&db_path)
        .with_context(|| format!("open database {}", db_path.display()))?;
    store.migrate().with_context(|| "run migrations")?;
    info!(path = %db_path.display(), "database ready");

    let catalog = ShipmentCatalog::new(config.data.shipments_path(), config.data.drivers_path());
    info!(path = %catalog.shipments_path().display(), "shipment catalog");
    if config.api_key.is_none() {
        warn!("no api key configured; write endpoints will reject every request");
    }

    let host = args.host.unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);
    let state = AppState::new(store, catalog, config.api_key.clone());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .with_context(|| "start async runtime")?;
    runtime.block_on({
        let state = state.clone();
        async move {
            let listener = TcpListener::bind((host.as_str(), port))
                .await
                .with_context(|| format!("bind {host}:{port}"))?;
            serve_http(listener, state, shutdown_signal())
                .await
                .with_context(|| "serve http")
        }
    })?;
    drop(runtime);

    match state.into_store() {
        Some(store) => match store.close() {
            Ok(()) => info!("database closed"),
            Err(err) => error!(error = %err, "failed to close database"),
        },
        None => warn!("database still in use at shutdown; leaving it to drop"),
    }
    Ok(())
}
