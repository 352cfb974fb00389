//! chatd - line-oriented multi-client chat server.
//!
//! Clients log in with a unique username, broadcast or whisper to each other
//! and gather in ad hoc groups. Outgoing traffic can be degraded on purpose
//! (dropped lines, corrupted lines, forced disconnects) to exercise clients.

mod config;
mod error;
mod handlers;
mod http;
mod metrics;
mod network;
mod state;

use crate::config::Config;
use crate::network::Gateway;
use crate::state::Matrix;
use anyhow::Context as _;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {config_path}"))?;

    init_tracing(&config);

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(path = %config_path, error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s) in {config_path}", errors.len());
    }

    info!(
        address = %config.listen.address,
        connection_loss = config.faults.connection_loss,
        dropped_packets = config.faults.dropped_packets,
        corrupted_packets = config.faults.corrupted_packets,
        unique_group_names = config.groups.unique_names,
        "Starting chatd"
    );

    metrics::init();
    if let Some(port) = config.server.metrics_port {
        tokio::spawn(http::run_http_server(port));
    }

    let matrix = Arc::new(Matrix::new(&config));
    let gateway = Gateway::bind(config.listen.address, Arc::clone(&matrix)).await?;

    tokio::select! {
        result = gateway.run() => result,
        _ = tokio::signal::ctrl_c() => {
            info!(users = matrix.registry.len(), "Shutting down");
            Ok(())
        }
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.log.json {
        builder.json().init();
    } else {
        builder.with_ansi(config.log.ansi).init();
    }
}
