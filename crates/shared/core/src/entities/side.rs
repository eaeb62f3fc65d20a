use serde::{Deserialize, Serialize};

/// Order side (Buy or Sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The `send_order` action used for a new order on this side
    pub fn new_order_action(&self) -> OrderAction {
        match self {
            Side::Buy => OrderAction::NewBuy,
            Side::Sell => OrderAction::NewSell,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

/// Order action code passed to `send_order`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderAction {
    /// 1: new buy
    NewBuy,
    /// 2: new sell
    NewSell,
    /// 3: cancel an outstanding order
    Cancel,
}

impl OrderAction {
    /// Numeric code understood by the control
    pub fn code(&self) -> i32 {
        match self {
            OrderAction::NewBuy => 1,
            OrderAction::NewSell => 2,
            OrderAction::Cancel => 3,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(OrderAction::NewBuy),
            2 => Some(OrderAction::NewSell),
            3 => Some(OrderAction::Cancel),
            _ => None,
        }
    }
}
