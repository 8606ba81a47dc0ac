//! Limner configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Main Limner configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Worker host tuning
    pub worker: WorkerConfig,

    /// Session defaults for the demo pipeline
    pub session: SessionConfig,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .limner.yml
        let local_config = PathBuf::from(".limner.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Worker host configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Engine iterations per batch before yielding back to the scheduler
    ///
    /// Smaller batches improve stop latency; larger batches amortize
    /// per-call overhead.
    #[serde(default = "default_batch_size", rename = "batch-size")]
    pub batch_size: u32,

    /// Channel buffer size for control messages
    #[serde(default = "default_control_buffer", rename = "control-buffer")]
    pub control_buffer: usize,

    /// Channel buffer size for engine events
    #[serde(default = "default_event_buffer", rename = "event-buffer")]
    pub event_buffer: usize,
}

fn default_batch_size() -> u32 {
    debug!("default_batch_size: called");
    1000
}

fn default_control_buffer() -> usize {
    debug!("default_control_buffer: called");
    64
}

fn default_event_buffer() -> usize {
    debug!("default_event_buffer: called");
    64
}

impl Default for WorkerConfig {
    fn default() -> Self {
        debug!("WorkerConfig::default: called");
        Self {
            batch_size: 1000,
            control_buffer: 64,
            event_buffer: 64,
        }
    }
}

/// Default session parameters used when the CLI does not override them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Target display refresh rate in frames per second
    #[serde(default = "default_target_fps", rename = "target-fps")]
    pub target_fps: u32,

    /// Candidate-pool capacity handed to the engine
    #[serde(default = "default_capacity")]
    pub capacity: u32,
}

fn default_target_fps() -> u32 {
    debug!("default_target_fps: called");
    30
}

fn default_capacity() -> u32 {
    debug!("default_capacity: called");
    1000
}

impl Default for SessionConfig {
    fn default() -> Self {
        debug!("SessionConfig::default: called");
        Self {
            target_fps: 30,
            capacity: 1000,
        }
    }
}
