use std::path::Path;
use thiserror::Error;

use super::types::BridgeConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Account number is required outside simulation mode")]
    MissingAccount,
    #[error("Timeout for {0} must be greater than zero")]
    InvalidTimeout(&'static str),
}

/// Load bridge configuration from a JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BridgeConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Load configuration from a JSON string
pub fn load_config_from_str(json: &str) -> Result<BridgeConfig, ConfigError> {
    let config: BridgeConfig = serde_json::from_str(json)?;
    Ok(config)
}

/// Load the default embedded configuration
pub fn load_default_config() -> Result<BridgeConfig, ConfigError> {
    let default_config = include_str!("bridge_config.json");
    load_config_from_str(default_config)
}

impl BridgeConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.simulation && self.account_no.trim().is_empty() {
            return Err(ConfigError::MissingAccount);
        }
        let timeouts = &self.timeouts;
        for (kind, ms) in [
            ("orders", timeouts.order_ms),
            ("cancels", timeouts.cancel_ms),
            ("queries", timeouts.query_ms),
        ] {
            if ms == 0 {
                return Err(ConfigError::InvalidTimeout(kind));
            }
        }
        Ok(())
    }
}
