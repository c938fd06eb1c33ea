//! Configuration for the sender.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    /// Network settings.
    pub network: NetworkConfig,
    /// Ball motion parameters.
    pub ball: BallConfig,
    /// Streaming and scoring settings.
    pub stream: StreamConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Network configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Address to listen on.
    pub bind_host: String,
    /// TCP port for the signaling rendezvous.
    pub signal_port: u16,
    /// TCP port for the media channel, advertised in the offer.
    pub media_port: u16,
}

/// Ball motion parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    /// Pixels per tick on both axes.
    pub velocity: i32,
    /// Ball radius in pixels.
    pub radius: i32,
    /// Frame width.
    pub width: u32,
    /// Frame height.
    pub height: u32,
}

/// Streaming and scoring settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Frames per second.
    pub fps: u32,
    /// Ground-truth entries older than this many ticks are evicted
    /// even if no estimate ever arrives for them.
    pub ledger_max_age_ticks: i64,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            ball: BallConfig::default(),
            stream: StreamConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_host: "127.0.0.1".into(),
            signal_port: 50051,
            media_port: 50052,
        }
    }
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            velocity: 5,
            radius: 40,
            width: 640,
            height: 480,
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            ledger_max_age_ticks: 300,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".into() }
    }
}

// ── Loading ──────────────────────────────────────────────────────

impl SenderConfig {
    /// Load configuration from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("invalid config {}: {e}; using defaults", path.display());
                Self::default()
            }),
            Err(_) => {
                tracing::info!("no config at {}; using defaults", path.display());
                Self::default()
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
