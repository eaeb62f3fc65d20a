use serde::{Deserialize, Serialize};

/// Classification of a chejan (fill/balance) notification by its gubun code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChejanKind {
    /// "0" or "4": order accepted/filled
    OrderFill,
    /// "1": balance changed
    Balance,
    /// "3": special signal
    SpecialSignal,
    Unknown(String),
}

impl ChejanKind {
    pub fn from_gubun(gubun: &str) -> Self {
        match gubun.trim() {
            "0" | "4" => ChejanKind::OrderFill,
            "1" => ChejanKind::Balance,
            "3" => ChejanKind::SpecialSignal,
            other => ChejanKind::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ChejanKind::OrderFill => "order_fill",
            ChejanKind::Balance => "balance",
            ChejanKind::SpecialSignal => "special_signal",
            ChejanKind::Unknown(code) => code,
        }
    }
}

/// Diagnostic classification of a broker message text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageClass {
    /// Mentions an order (주문) and success (성공)
    OrderSucceeded,
    /// Mentions an order (주문) and failure (실패)
    OrderFailed,
    /// Mentions an order without a verdict
    OrderOther,
    Other,
}

impl MessageClass {
    pub fn classify(text: &str) -> Self {
        if !text.contains("주문") {
            return MessageClass::Other;
        }
        if text.contains("성공") {
            MessageClass::OrderSucceeded
        } else if text.contains("실패") {
            MessageClass::OrderFailed
        } else {
            MessageClass::OrderOther
        }
    }
}
