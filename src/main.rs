//! Meme Proxy
//!
//! A plain-HTTP forward proxy that relays requests to the origin and, on
//! the way back, swaps images for ones from a local pool.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────────────┐
//!                    │                        MEME PROXY                        │
//!                    │                                                          │
//!                    │  ┌──────────┐   ┌──────────┐   ┌──────────────┐          │
//!   Client Request ──┼─▶│   net    │──▶│  proxy   │──▶│ http framing │          │
//!                    │  │ listener │   │ handler  │   │  + request   │          │
//!                    │  └──────────┘   └────┬─────┘   └──────────────┘          │
//!                    │                      │ Host == easter egg?               │
//!                    │           ┌──────────┴──────────┐                        │
//!                    │           ▼                     ▼                        │
//!                    │    ┌─────────────┐       ┌──────────────┐                │
//!                    │    │ easter egg  │       │   upstream   │◀───────────────┼──── Origin
//!                    │    │    page     │       │ (Host, :80)  │                │     Server
//!                    │    └──────┬──────┘       └──────┬───────┘                │
//!                    │           │                     ▼                        │
//!                    │           │              ┌──────────────┐                │
//!   Client Response ◀┼───────────┴──────────────│   rewrite    │◀── pool        │
//!                    │                          │ html / image │                │
//!                    │                          └──────────────┘                │
//!                    │                                                          │
//!                    └──────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use meme_proxy::config::{resolve_config, ConfigOverrides};
use meme_proxy::lifecycle::{self, signals, Shutdown};
use meme_proxy::observability::logging;
use meme_proxy::ProxyServer;

#[derive(Parser)]
#[command(name = "meme-proxy")]
#[command(about = "Plain-HTTP forward proxy that swaps images for memes", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, e.g. 127.0.0.1:8080
    #[arg(short, long)]
    bind: Option<String>,

    /// Directory holding replacement images
    #[arg(long)]
    pool_dir: Option<String>,

    /// Host answered with the easter egg page
    #[arg(long)]
    easter_egg_host: Option<String>,

    /// Chance (0.0-1.0) that any single image is replaced
    #[arg(long)]
    probability: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        bind_address: cli.bind,
        pool_directory: cli.pool_dir,
        easter_egg_host: cli.easter_egg_host,
        probability: cli.probability,
    };
    let config = resolve_config(cli.config.as_deref(), &overrides)?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "meme-proxy starting");

    let prepared = lifecycle::prepare(&config)?;

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    tokio::spawn(signals::forward_ctrl_c(shutdown.clone()));

    let server = ProxyServer::new(&config, prepared.pool);
    server.run(prepared.listener, shutdown_rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
