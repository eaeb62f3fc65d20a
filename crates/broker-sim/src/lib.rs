//! Kiwi Simulated Broker
//!
//! In-process stand-in for the broker control. Calls return immediately with
//! a scripted result code; replies are delivered later, one at a time, from a
//! dedicated dispatch thread running a single-threaded tokio runtime, the way
//! the real control raises its events on its own message loop.

// Scripted replies and behaviours
pub mod model;

// Control implementation and its dispatch loop
pub mod control;
mod dispatch;

// Cross-cutting concerns
pub mod error;

// Re-export main types for convenience
pub use control::{SimConfig, SimCounters, SimulatedControl};
pub use error::{Result, SimError};
pub use model::{OrderScript, ScriptedRecord, TrScript, result_codes};
