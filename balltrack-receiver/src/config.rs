//! Configuration for the receiver.

use std::path::Path;

use serde::{Deserialize, Serialize};

use balltrack_core::DetectorConfig;

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    /// Network settings.
    pub network: NetworkConfig,
    /// Ingestion pipeline settings.
    pub pipeline: PipelineConfig,
    /// Detector tuning.
    pub detector: DetectorKnobs,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Network configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Sender's signaling endpoint, e.g. "127.0.0.1:50051".
    pub signal_addr: String,
    /// Milliseconds between dial retries while the sender does not
    /// exist yet.
    pub dial_retry_ms: u64,
}

/// Ingestion pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum queued frames before drop-oldest kicks in.
    pub queue_capacity: usize,
}

/// Detector tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorKnobs {
    /// Accumulator cell size in pixels.
    pub accumulator_scale: u32,
    /// Minimum separation between candidate centers, in cells.
    pub min_center_distance: u32,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            pipeline: PipelineConfig::default(),
            detector: DetectorKnobs::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            signal_addr: "127.0.0.1:50051".into(),
            dial_retry_ms: 500,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { queue_capacity: 64 }
    }
}

impl Default for DetectorKnobs {
    fn default() -> Self {
        let defaults = DetectorConfig::default();
        Self {
            accumulator_scale: defaults.accumulator_scale,
            min_center_distance: defaults.min_center_distance,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".into() }
    }
}

// ── Loading ──────────────────────────────────────────────────────

impl ReceiverConfig {
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

    /// Detector knobs as the core config type.
    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            accumulator_scale: self.detector.accumulator_scale,
            min_center_distance: self.detector.min_center_distance,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let cfg = ReceiverConfig::default();
        let text = toml::to_string_pretty(&cfg).unwrap();
        assert!(text.contains("signal_addr"));
        assert!(text.contains("queue_capacity"));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: ReceiverConfig =
            toml::from_str("[pipeline]\nqueue_capacity = 8\n").unwrap();
        assert_eq!(cfg.pipeline.queue_capacity, 8);
        assert_eq!(cfg.detector.accumulator_scale, 6);
    }
}
