//! Bridge configuration
//!
//! Resolved once and handed to the facade at construction; nothing is read
//! from global state afterwards.

mod loader;
mod types;

pub use loader::{ConfigError, load_config, load_config_from_str, load_default_config};
pub use types::{BridgeConfig, TimeoutConfig};
