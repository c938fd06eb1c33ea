//! balltrack receiver — entry point.
//!
//! ```text
//! balltrack-receiver                  Run with defaults / balltrack-receiver.toml
//! balltrack-receiver --config <path>  Load a custom config TOML
//! balltrack-receiver --gen-config     Write default config to stdout
//! ```

mod config;
mod receiver;

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ReceiverConfig;
use crate::receiver::Receiver;

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "balltrack-receiver", about = "Ingests the ball stream and reports position estimates")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "balltrack-receiver.toml")]
    config: PathBuf,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // --gen-config: dump defaults and exit.
    if cli.gen_config {
        let text = toml::to_string_pretty(&ReceiverConfig::default())?;
        println!("{text}");
        return Ok(());
    }

    // Load config.
    let config = ReceiverConfig::load(&cli.config);

    // Init tracing.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("balltrack-receiver v{}", env!("CARGO_PKG_VERSION"));
    info!("signaling endpoint: {}", config.network.signal_addr);
    info!("queue capacity: {}", config.pipeline.queue_capacity);

    let service = Receiver::new(config);

    tokio::select! {
        result = service.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received — shutting down");
        }
    }

    Ok(())
}
