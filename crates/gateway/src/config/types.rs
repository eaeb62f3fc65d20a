use kiwi_core::RequestKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration of the bridge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Account orders and account queries are issued against
    #[serde(default)]
    pub account_no: String,
    /// Account password staged for account queries
    #[serde(default)]
    pub account_password: String,
    /// Short-circuit orders without contacting the broker
    #[serde(default)]
    pub simulation: bool,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            account_no: String::new(),
            account_password: String::new(),
            simulation: false,
            timeouts: TimeoutConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Configuration for a live account
    pub fn for_account(account_no: impl Into<String>, password: impl Into<String>) -> Self {
        BridgeConfig {
            account_no: account_no.into(),
            account_password: password.into(),
            ..Default::default()
        }
    }

    /// Builder: toggle simulation mode
    pub fn with_simulation(mut self, simulation: bool) -> Self {
        self.simulation = simulation;
        self
    }

    /// Builder: replace all timeouts
    pub fn with_timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }
}

/// Bounded waits per request kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_order_timeout_ms")]
    pub order_ms: u64,
    #[serde(default = "default_cancel_timeout_ms")]
    pub cancel_ms: u64,
    #[serde(default = "default_query_timeout_ms")]
    pub query_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        TimeoutConfig {
            order_ms: default_order_timeout_ms(),
            cancel_ms: default_cancel_timeout_ms(),
            query_ms: default_query_timeout_ms(),
        }
    }
}

impl TimeoutConfig {
    /// Same bound for every request kind
    pub fn uniform(ms: u64) -> Self {
        TimeoutConfig {
            order_ms: ms,
            cancel_ms: ms,
            query_ms: ms,
        }
    }

    pub fn for_kind(&self, kind: RequestKind) -> Duration {
        let ms = match kind {
            RequestKind::Order => self.order_ms,
            RequestKind::Cancel => self.cancel_ms,
            RequestKind::TrQuery => self.query_ms,
        };
        Duration::from_millis(ms)
    }
}

fn default_order_timeout_ms() -> u64 {
    10_000
}

fn default_cancel_timeout_ms() -> u64 {
    10_000
}

fn default_query_timeout_ms() -> u64 {
    5_000
}
