//! Kiwi Ports
//!
//! Port definitions (traits) for the Kiwi trading bridge.
//! These define the boundary between the bridge and the external broker
//! control: the calls the bridge makes, the notifications it receives, and the
//! sink it reports failures to.

pub mod codes;
mod control;
mod events;
mod sink;

pub use control::{BrokerControl, OrderTicket};
pub use events::{BrokerEvents, TrDataEvent};
pub use sink::FailureSink;
