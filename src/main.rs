//! Deposit desk service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Web front end / deposit-cli
//!         │
//!         ▼
//!     ┌──────────┐     ┌──────────────┐     ┌────────────────┐
//!     │   http   │────▶│ registrations│────▶│ storage.json   │
//!     │  server  │     │    store     │     └────────────────┘
//!     └────┬─────┘     └──────────────┘
//!          │ read-only views
//!          ▼
//!     ┌──────────────┐     ┌────────────────┐
//!     │ ChainClient  │────▶│ deposit        │
//!     │ (failover)   │     │ contract       │
//!     └──────────────┘     └────────────────┘
//! ```
//!
//! Signing never happens here: deposits and redemptions are signed by the
//! user's wallet (or `deposit-cli`); the service records and reports.
//!
//! Usage: `deposit-desk [config.toml]` (or `DEPOSIT_DESK_CONFIG`).

use alloy::primitives::Address;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use deposit_desk::blockchain::ChainClient;
use deposit_desk::config::{load_config, AppConfig};
use deposit_desk::http::{AppState, HttpServer};
use deposit_desk::observability::{init_logging, metrics, LoggingConfig};
use deposit_desk::registrations::FileStore;

const CONFIG_ENV_VAR: &str = "DEPOSIT_DESK_CONFIG";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_ENV_VAR).ok())
        .map(PathBuf::from);

    let config = match &config_path {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    init_logging(&LoggingConfig::from_observability(&config.observability));
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "deposit-desk starting");

    tracing::info!(
        config = ?config_path,
        bind_address = %config.server.bind_address,
        chain_id = config.chain.descriptor.chain_id,
        contract = %config.contract.address,
        storage = %config.storage.path,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let contract: Address = config.contract.address.parse()?;
    let client = ChainClient::new(&config.chain, contract)?;
    match client.get_chain_id().await {
        Ok(id) if id.0 == config.chain.descriptor.chain_id => {
            tracing::info!(chain_id = %id, "Connected to chain")
        }
        Ok(id) => tracing::warn!(
            expected = config.chain.descriptor.chain_id,
            actual = %id,
            "RPC endpoint reports a different chain"
        ),
        Err(e) => tracing::warn!(error = %e, "Chain not reachable yet, continuing"),
    }

    let store = Arc::new(FileStore::new(&config.storage.path));
    let state = AppState::new(store, config.chain.descriptor.clone())
        .with_chain_client(Arc::new(client));

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    HttpServer::new(&config.server, state).run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
