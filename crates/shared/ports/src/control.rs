use std::sync::Arc;

use kiwi_core::{OrderAction, Price, Quantity};
use serde::{Deserialize, Serialize};

use crate::events::BrokerEvents;

/// Arguments of a `send_order` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTicket {
    /// Name the order is issued under; the result notification carries it back
    pub issuing_name: String,
    pub screen: String,
    pub account_no: String,
    pub action: OrderAction,
    pub code: String,
    pub quantity: Quantity,
    pub price: Price,
    /// Price-type code ("00" limit, "1" market)
    pub price_type: String,
    /// Order being cancelled; empty for new orders
    pub original_order_no: String,
}

/// Port for the external broker control
///
/// Every call returns immediately. Results of `send_order` and
/// `comm_request_data` arrive later through [`BrokerEvents`], on the
/// control's own dispatch context. A nonzero immediate result code means no
/// notification will follow.
///
/// `get_comm_data` and `get_repeat_count` read the reply currently being
/// delivered and are only meaningful from within a notification callback.
pub trait BrokerControl: Send + Sync {
    /// Whether the control is logged in and connected
    fn is_connected(&self) -> bool;

    /// Register the receiver of all notifications
    fn connect_events(&self, events: Arc<dyn BrokerEvents>);

    /// Submit an order; 0 = accepted for processing
    fn send_order(&self, ticket: &OrderTicket) -> i32;

    /// Stage one named input for the next `comm_request_data`
    fn set_input_value(&self, field: &str, value: &str);

    /// Submit a TR query with the staged inputs; 0 = accepted for processing
    fn comm_request_data(&self, issuing_name: &str, tr_code: &str, prev_next: i32, screen: &str)
    -> i32;

    /// Read one field of the reply being delivered
    fn get_comm_data(&self, tr_code: &str, issuing_name: &str, row: i32, field: &str) -> String;

    /// Number of repeated rows in the reply being delivered
    fn get_repeat_count(&self, tr_code: &str, issuing_name: &str) -> i32;

    /// Login/account metadata by key (USER_ID, USER_NAME, ...)
    fn get_login_info(&self, key: &str) -> String;

    /// Last price from the cached master data
    fn get_master_last_price(&self, code: &str) -> String;

    /// Stock name from the cached master data
    fn get_master_code_name(&self, code: &str) -> String;
}
