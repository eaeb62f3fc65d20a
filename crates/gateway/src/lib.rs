//! Kiwi Gateway
//!
//! Synchronous request/response facade over a broker control whose results
//! arrive only as asynchronous notifications. Provides:
//! - Request correlation by issuing name and per-request screen, with single-use
//!   gates for the waiting caller
//! - A callback router that decodes notifications into typed results
//! - Field parsers tolerant of thousands separators and malformed values
//! - The trading facade: orders, account queries, rankings, master data
//!
//! ## Architecture
//!
//! ```text
//!  caller thread                         control dispatch context
//!  ─────────────                         ────────────────────────
//!  TradingFacade::buy(..)
//!    │ begin_request(BuyOrder) ──► RequestCorrelator ◄── resolve(BuyOrder) ◄─┐
//!    │ send_order ───────────────► BrokerControl ──► OnReceiveTrData ──► CallbackRouter
//!    │ gate.wait(timeout)                                                      │
//!    ▼ take(BuyOrder) ◄──────────────── gate released ◄────────────────────────┘
//! ```
//!
//! One in-flight request per issuing name; distinct names proceed concurrently.

pub mod config;
pub mod correlator;
pub mod error;
pub mod facade;
pub mod gate;
pub mod parser;
pub mod router;
pub mod screens;
pub mod sink;

// Re-export commonly used types
pub use config::{BridgeConfig, ConfigError, TimeoutConfig, load_config, load_default_config};
pub use correlator::{LastResolution, RequestCorrelator, Resolution};
pub use error::{Result, TradingError};
pub use facade::TradingFacade;
pub use gate::{Gate, GateStatus};
pub use router::{CallbackRouter, RouterStats};
pub use screens::ScreenPool;
pub use sink::LogFailureSink;
