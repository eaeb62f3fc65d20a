use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{OrderOutcome, TrResult};

/// Unique identifier for an issued request
pub type RequestId = Uuid;

/// What kind of round trip a request makes through the control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestKind {
    /// New buy or sell order via `send_order`
    Order,
    /// Cancellation via `send_order`
    Cancel,
    /// TR query via `set_input_value` + `comm_request_data`
    TrQuery,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::Cancel => "cancel",
            Self::TrQuery => "tr_query",
        }
    }
}

/// A request issued to the control
///
/// The control never echoes an id back. Notifications are matched on
/// `issuing_name` plus the `screen` the request was issued on, which the
/// control does echo; every request gets a screen of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub kind: RequestKind,
    /// Name the request is issued under (the correlation key)
    pub issuing_name: String,
    /// Screen number the request is issued on
    pub screen: String,
    /// TR code, for TR queries
    pub tr_code: Option<String>,
    /// Input fields staged before submission, in order
    pub inputs: Vec<(String, String)>,
}

impl Request {
    /// Create an order or cancel request
    pub fn order(
        kind: RequestKind,
        issuing_name: impl Into<String>,
        screen: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            issuing_name: issuing_name.into(),
            screen: screen.into(),
            tr_code: None,
            inputs: Vec::new(),
        }
    }

    /// Create a TR query request
    pub fn tr_query(
        issuing_name: impl Into<String>,
        tr_code: impl Into<String>,
        screen: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: RequestKind::TrQuery,
            issuing_name: issuing_name.into(),
            screen: screen.into(),
            tr_code: Some(tr_code.into()),
            inputs: Vec::new(),
        }
    }

    /// Append an input field (builder style)
    pub fn with_input(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.inputs.push((field.into(), value.into()));
        self
    }

    /// Correlation key
    pub fn key(&self) -> &str {
        &self.issuing_name
    }
}

/// Typed payload delivered by a terminal notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Reply {
    Order(OrderOutcome),
    Tr(TrResult),
}

impl Reply {
    pub fn into_order(self) -> Option<OrderOutcome> {
        match self {
            Reply::Order(outcome) => Some(outcome),
            Reply::Tr(_) => None,
        }
    }

    pub fn into_tr(self) -> Option<TrResult> {
        match self {
            Reply::Tr(result) => Some(result),
            Reply::Order(_) => None,
        }
    }
}
