use std::collections::HashMap;
use std::time::Duration;

/// Immediate result codes returned by the control
pub mod result_codes {
    pub const OK: i32 = 0;
    /// Not connected to the server
    pub const CONNECT: i32 = -101;
    /// Query rate limit exceeded
    pub const QUERY_OVERFLOW: i32 = -200;
    /// Order rate limit exceeded
    pub const ORDER_OVERFLOW: i32 = -308;
}

/// Reply data readable through `get_comm_data` while it is being delivered
///
/// Single fields answer for every row; repeated rows shadow them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptedRecord {
    single: HashMap<String, String>,
    rows: Vec<HashMap<String, String>>,
    repeat_count: Option<i32>,
}

impl ScriptedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.single.insert(name.into(), value.into());
        self
    }

    pub fn with_row(mut self, fields: &[(&str, &str)]) -> Self {
        self.rows.push(
            fields
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        );
        self
    }

    /// Report a repeat count different from the number of rows
    pub fn with_repeat_count(mut self, count: i32) -> Self {
        self.repeat_count = Some(count);
        self
    }

    pub fn field(&self, row: i32, name: &str) -> String {
        usize::try_from(row)
            .ok()
            .and_then(|row| self.rows.get(row))
            .and_then(|fields| fields.get(name))
            .or_else(|| self.single.get(name))
            .cloned()
            .unwrap_or_default()
    }

    pub fn repeat_count(&self) -> i32 {
        self.repeat_count
            .unwrap_or_else(|| i32::try_from(self.rows.len()).unwrap_or(i32::MAX))
    }
}

/// How the control answers a TR query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrScript {
    /// Deliver the record after the control's latency
    Reply(ScriptedRecord),
    /// Deliver the record after a specific delay
    Delayed(ScriptedRecord, Duration),
    /// Refuse immediately with this code
    Fail(i32),
    /// Accept and never answer
    Silent,
}

/// How the control answers an order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OrderScript {
    /// Accept with the next sequential order number
    #[default]
    Accept,
    /// Accept after a specific delay
    Delayed(Duration),
    /// Answer with an empty order number and this state
    Reject(String),
    /// Refuse immediately with this code
    Fail(i32),
    /// Accept and never answer
    Silent,
}
