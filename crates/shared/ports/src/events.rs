use serde::{Deserialize, Serialize};

/// Payload of an `OnReceiveTrData` notification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrDataEvent {
    pub screen: String,
    /// Name the originating request was issued under
    pub issuing_name: String,
    pub tr_code: String,
    pub record_name: String,
    /// "2" when more data is available
    pub prev_next: String,
    pub data_len: i32,
    pub error_code: String,
    pub message: String,
    pub supplemental_message: String,
}

/// Port for the notifications emitted by the broker control
///
/// Implementations are invoked on the control's dispatch context and must not
/// block it.
pub trait BrokerEvents: Send + Sync {
    /// Fill/balance notification (OnReceiveChejanData)
    fn on_receive_chejan_data(&self, gubun: &str, item_count: i32, fid_list: &str);

    /// Free-form server message (OnReceiveMsg)
    fn on_receive_msg(&self, screen: &str, issuing_name: &str, tr_code: &str, text: &str);

    /// Terminal data for an order or TR query (OnReceiveTrData)
    fn on_receive_tr_data(&self, event: &TrDataEvent);
}
