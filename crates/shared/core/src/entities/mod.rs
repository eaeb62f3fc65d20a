mod account;
mod notification;
mod order_type;
mod outcome;
mod request;
mod side;
mod tr_result;

pub use account::{AccountBalance, AccountInfo};
pub use notification::{ChejanKind, MessageClass};
pub use order_type::{OrderType, UnsupportedOrderType};
pub use outcome::{OrderAck, OrderOutcome};
pub use request::{Reply, Request, RequestId, RequestKind};
pub use side::{OrderAction, Side};
pub use tr_result::{HoldingRow, Holdings, OrderableFunds, RankedStock, TrResult, UpsurgeStock};
