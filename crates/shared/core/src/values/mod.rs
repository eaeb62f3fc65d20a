use chrono::{DateTime, Utc};

/// Price in whole won. The control reports prices as integer text.
pub type Price = i64;

/// Share quantity
pub type Quantity = i64;

/// Monetary amount in whole won (funds, turnover, investment totals)
pub type Amount = i64;

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;

/// Six-digit stock code as used by the control (e.g. "005930")
pub type StockCode = String;
