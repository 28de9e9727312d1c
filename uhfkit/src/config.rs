//! Reader configuration

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use uhfkit_core::constants::{
    DEFAULT_BAUD_RATE, DEFAULT_POLL_INTERVAL_MS, DEFAULT_READ_TIMEOUT_MS, DEFAULT_SETTLE_DELAY_MS,
};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Reader link and acquisition settings
///
/// Every field has a default, so a config file only needs the values it
/// changes:
///
/// ```toml
/// port = "/dev/ttyUSB0"
/// tid_required_count = 3
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Serial port name (`COM4`, `/dev/ttyUSB0`)
    pub port: String,
    pub baud_rate: u32,
    /// Per-read byte timeout
    pub read_timeout_ms: u64,
    /// Pause between writing a command and reading its response
    pub settle_delay_ms: u64,
    /// Sleep between polls of the inbound buffer
    pub poll_interval_ms: u64,
    /// Consecutive identical TIDs needed to confirm a read
    pub tid_required_count: u32,
    /// Time budget for one TID acquisition
    pub tid_max_duration_ms: u64,
    /// Pause between the steps of a mode reset
    pub operation_delay_ms: u64,
    /// How long one inventory read listens for tags
    pub inventory_window_ms: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            port: "COM4".to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            tid_required_count: 5,
            tid_max_duration_ms: 2_000,
            operation_delay_ms: 500,
            inventory_window_ms: 500,
        }
    }
}

impl ReaderConfig {
    /// Config for `port` with every other value defaulted
    pub fn for_port(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            ..Self::default()
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port.trim().is_empty() {
            return Err(ConfigError::Validation("Port cannot be empty".to_string()));
        }
        if self.baud_rate == 0 {
            return Err(ConfigError::Validation(
                "Baud rate must be greater than 0".to_string(),
            ));
        }
        if self.tid_required_count == 0 {
            return Err(ConfigError::Validation(
                "TID required count must be at least 1".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "Poll interval must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn tid_max_duration(&self) -> Duration {
        Duration::from_millis(self.tid_max_duration_ms)
    }

    pub fn operation_delay(&self) -> Duration {
        Duration::from_millis(self.operation_delay_ms)
    }

    pub fn inventory_window(&self) -> Duration {
        Duration::from_millis(self.inventory_window_ms)
    }
}
