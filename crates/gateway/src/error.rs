//! Error types for the gateway crate

use kiwi_core::UnsupportedOrderType;
use std::time::Duration;
use thiserror::Error;

use crate::correlator::CorrelationError;

/// Failures of facade operations
///
/// Every variant is reported to the failure sink before it is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TradingError {
    #[error("Broker control is not connected")]
    NotConnected,

    #[error("Unsupported order type: {0}")]
    UnsupportedOrderType(String),

    #[error("Order rejected under {issuing_name} (state: {state:?})")]
    OrderRejected { issuing_name: String, state: String },

    #[error("{operation} refused by the control (code: {code})")]
    ImmediateSendFailure { operation: String, code: i32 },

    #[error("No notification under {key} within {timeout:?}")]
    RequestTimeout { key: String, timeout: Duration },

    #[error("Request already in flight under {0}")]
    DuplicateInFlight(String),

    #[error("Request under {0} was released without a result")]
    MissingResult(String),

    #[error("Unexpected reply shape under {0}")]
    UnexpectedReply(String),
}

impl TradingError {
    /// Failures where the request may never have reached the broker
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            TradingError::NotConnected
                | TradingError::UnsupportedOrderType(_)
                | TradingError::DuplicateInFlight(_)
        )
    }
}

impl From<CorrelationError> for TradingError {
    fn from(err: CorrelationError) -> Self {
        match err {
            CorrelationError::AlreadyInFlight(key) => TradingError::DuplicateInFlight(key),
        }
    }
}

impl From<UnsupportedOrderType> for TradingError {
    fn from(err: UnsupportedOrderType) -> Self {
        TradingError::UnsupportedOrderType(err.0)
    }
}

pub type Result<T> = std::result::Result<T, TradingError>;
