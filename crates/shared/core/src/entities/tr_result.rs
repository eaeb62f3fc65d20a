use serde::{Deserialize, Serialize};

use crate::values::{Amount, Price, Quantity, StockCode};

/// Orderable cash (opw00001)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderableFunds {
    /// 예수금
    pub deposit: Amount,
    /// 주문가능금액
    pub available_funds: Amount,
}

/// One position of the account evaluation (opw00018)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldingRow {
    pub code: StockCode,
    pub name: String,
    pub quantity: Quantity,
    /// Per-share purchase price (매입가). Not the same figure as an average
    /// cost after partial sells; only the purchase price field is read.
    pub purchase_price: Price,
    pub current_price: Price,
}

impl HoldingRow {
    /// Current value of the position, saturating at the bounds of [`Amount`]
    pub fn market_value(&self) -> Amount {
        self.quantity.saturating_mul(self.current_price)
    }
}

/// Account evaluation with its positions (opw00018)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holdings {
    /// 총매입금액
    pub total_investment: Amount,
    pub rows: Vec<HoldingRow>,
}

/// Entry of the daily volume ranking (OPT10030)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedStock {
    pub code: StockCode,
    pub name: String,
    pub price: Price,
    pub volume: Quantity,
    /// Turnover (거래금액)
    pub amount: Amount,
}

/// Entry of the volume upsurge ranking (OPT10023)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsurgeStock {
    pub code: StockCode,
    pub name: String,
    pub price: Price,
    pub previous_volume: Quantity,
    pub current_volume: Quantity,
    /// 등락률 as delivered, e.g. "+3.25"
    pub fluctuation_rate_text: String,
}

impl UpsurgeStock {
    /// Fluctuation rate in percent; malformed text reads as 0.0
    pub fn fluctuation_rate(&self) -> f64 {
        self.fluctuation_rate_text
            .trim()
            .replace(',', "")
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }
}

/// Decoded TR reply, one variant per TR code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrResult {
    /// opw00001
    OrderableFunds(OrderableFunds),
    /// opw00018
    Holdings(Holdings),
    /// OPT10030
    VolumeRanking(Vec<RankedStock>),
    /// OPT10023
    UpsurgeRanking(Vec<UpsurgeStock>),
}

impl TrResult {
    /// TR code this result was decoded from
    pub fn tr_code(&self) -> &'static str {
        match self {
            Self::OrderableFunds(_) => "opw00001",
            Self::Holdings(_) => "opw00018",
            Self::VolumeRanking(_) => "OPT10030",
            Self::UpsurgeRanking(_) => "OPT10023",
        }
    }

    /// Number of repeated rows carried by the result
    pub fn row_count(&self) -> usize {
        match self {
            Self::OrderableFunds(_) => 0,
            Self::Holdings(h) => h.rows.len(),
            Self::VolumeRanking(rows) => rows.len(),
            Self::UpsurgeRanking(rows) => rows.len(),
        }
    }
}
