//! Kiwi Core Domain
//!
//! Pure domain types for the Kiwi trading bridge: the requests issued to the
//! broker control and the typed results decoded from its notifications.
//! This crate contains no threading, no I/O, and is 100% unit testable.

pub mod entities;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    // Accounts
    AccountBalance,
    AccountInfo,
    // Notifications
    ChejanKind,
    // TR results
    HoldingRow,
    Holdings,
    MessageClass,
    // Orders
    OrderAck,
    OrderAction,
    OrderOutcome,
    OrderType,
    OrderableFunds,
    RankedStock,
    // Requests
    Reply,
    Request,
    RequestId,
    RequestKind,
    Side,
    TrResult,
    UnsupportedOrderType,
    UpsurgeStock,
};
pub use values::{Amount, Price, Quantity, StockCode, Timestamp};
