use serde::{Deserialize, Serialize};

use crate::values::{Price, Quantity};

/// Result of an order or cancel request, read from the order-result notification
///
/// An empty `order_number` means the broker did not accept the order even
/// though `send_order` returned 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderOutcome {
    /// Broker-assigned order number (주문번호)
    pub order_number: String,
    /// Order state text as reported (주문상태), e.g. "접수"
    pub state: String,
    /// Ordered quantity (주문수량)
    pub quantity: Quantity,
    /// Ordered price (주문가격)
    pub price: Price,
}

impl OrderOutcome {
    pub fn is_accepted(&self) -> bool {
        !self.order_number.trim().is_empty()
    }
}

/// Success value of a buy, sell or cancel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderAck {
    /// Simulation mode: nothing was sent to the broker
    Simulated,
    /// Broker acknowledged the order with a non-empty order number
    Confirmed(OrderOutcome),
}

impl OrderAck {
    /// Broker order number, if the order actually went out
    pub fn order_number(&self) -> Option<&str> {
        match self {
            OrderAck::Simulated => None,
            OrderAck::Confirmed(outcome) => Some(outcome.order_number.as_str()),
        }
    }

    pub fn is_simulated(&self) -> bool {
        matches!(self, OrderAck::Simulated)
    }
}
