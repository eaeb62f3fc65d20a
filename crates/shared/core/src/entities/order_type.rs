use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Order types accepted by the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    /// Execute at current market price (시장가)
    Market,
    /// Execute at specified price or better (지정가)
    Limit,
}

impl OrderType {
    /// Price-type code passed to `send_order`
    pub fn price_type_code(&self) -> &'static str {
        match self {
            OrderType::Market => "1",
            OrderType::Limit => "00",
        }
    }
}

/// Raised when an order type label is neither market nor limit
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported order type: {0}")]
pub struct UnsupportedOrderType(pub String);

impl FromStr for OrderType {
    type Err = UnsupportedOrderType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "시장가" => Ok(OrderType::Market),
            "지정가" => Ok(OrderType::Limit),
            other if other.eq_ignore_ascii_case("market") => Ok(OrderType::Market),
            other if other.eq_ignore_ascii_case("limit") => Ok(OrderType::Limit),
            other => Err(UnsupportedOrderType(other.to_string())),
        }
    }
}
