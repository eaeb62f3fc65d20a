//! Kiwi Runner - Demo Session
//!
//! Wires the trading facade to a seeded simulated control and exercises every
//! operation once:
//!
//! - **Bootstrap**: sample master data, login info and scripted TR replies
//! - **Session**: account, market data, rankings, then buy/sell/cancel
//!
//! ```text
//!   run_session ──► TradingFacade ──► SimulatedControl
//!        ▲                                  │ dispatch thread
//!        └────────── typed results ◄── CallbackRouter
//! ```

pub mod bootstrap;
pub mod error;
pub mod session;

// Re-export main types
pub use bootstrap::{DEMO_STOCKS, DemoStock, seeded_control};
pub use error::{Result, RunnerError};
pub use session::{SessionReport, run_session};
