use serde::{Deserialize, Serialize};

use crate::values::Amount;

/// Investment total and orderable cash, combined from opw00018 and opw00001
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub total_investment: Amount,
    pub available_funds: Amount,
}

/// Login session metadata
///
/// The account number comes from configuration; the remaining fields are read
/// from the control's login info.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub account_no: String,
    pub user_id: String,
    pub user_name: String,
    /// "1" on the mock-investment server
    pub server_kind: String,
    /// Keyboard security state
    pub keyboard_security: String,
    /// Firewall state
    pub firewall: String,
}

impl AccountInfo {
    pub fn is_mock_server(&self) -> bool {
        self.server_kind.trim() == "1"
    }
}
