//! balltrack sender — entry point.
//!
//! ```text
//! balltrack-sender                  Run with defaults / balltrack-sender.toml
//! balltrack-sender --config <path>  Load a custom config TOML
//! balltrack-sender --gen-config     Write default config to stdout
//! ```

mod config;
mod sender;

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::SenderConfig;
use crate::sender::Sender;

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "balltrack-sender", about = "Streams a bouncing ball and scores position estimates")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "balltrack-sender.toml")]
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
        let text = toml::to_string_pretty(&SenderConfig::default())?;
        println!("{text}");
        return Ok(());
    }

    // Load config.
    let config = SenderConfig::load(&cli.config);

    // Init tracing.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("balltrack-sender v{}", env!("CARGO_PKG_VERSION"));
    info!("signal port: {}", config.network.signal_port);
    info!("media port: {}", config.network.media_port);
    info!(
        "ball: v={} r={} {}x{}",
        config.ball.velocity, config.ball.radius, config.ball.width, config.ball.height
    );

    let service = Sender::new(config);

    tokio::select! {
        // A session-fatal failure propagates out as a nonzero exit.
        result = service.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received — shutting down");
        }
    }

    Ok(())
}
