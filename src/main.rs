mod config;
mod encoding;
mod error;
mod persist;
mod protocol;
mod server;
mod store;
mod util;

use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;
use config::{Config, LogConfig};
use server::Server;
use store::Service;
use tracing::{error, info};
use util::time::SystemClock;

/// Keyed slot store with a price oracle, served over RESP
#[derive(Debug, Parser)]
#[command(name = "slotdb", version)]
struct Args {
    /// Path to the INI configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Listening address, overrides [server] addr
    #[arg(long)]
    addr: Option<String>,

    /// Log level, overrides [log] level
    #[arg(long)]
    log_level: Option<String>,
}

fn init_logging(log: &LogConfig) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true);

    match &log.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file '{}'", path))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(addr) = args.addr {
        config.server.addr = addr;
    }
    if let Some(level) = args.log_level {
        config.log.level = level;
    }

    // Initialize logging
    init_logging(&config.log)?;

    info!("Starting SlotDB - keyed slot store with price oracle");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let service = Arc::new(
        Service::open(&config, Arc::new(SystemClock)).context("failed to start service")?,
    );

    // Create and start TCP server
    let server = Arc::new(Server::bind(&config.server.addr, Arc::clone(&service)).await?);
    info!("Server listening on: {}", server.local_addr());

    tokio::select! {
        _ = server.run() => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown signal received");
        }
    }

    service.shutdown().context("failed to flush storage")?;
    info!("SlotDB stopped");
    Ok(())
}
