//! Response parsing
//!
//! Converts the control's raw field text into typed values. Every numeric
//! field goes through the same rule: trim, drop thousands separators, parse.
//! Anything that does not parse reads as zero; a parse anomaly is logged and
//! never surfaces to the caller.

use kiwi_core::{
    HoldingRow, Holdings, OrderOutcome, OrderableFunds, RankedStock, TrResult, UpsurgeStock,
};
use kiwi_ports::BrokerControl;
use kiwi_ports::codes::{TrCodes, fields, order_fields};
use log::debug;
use thiserror::Error;

/// Ranking replies keep only the top of the list
pub const RANKING_LIMIT: usize = 20;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unparseable numeric text: {text:?}")]
pub(crate) struct ParseAnomaly {
    text: String,
}

/// Read access to the reply currently being delivered
pub trait FieldSource {
    /// Raw text of `field` in `row` (row 0 for single-record fields)
    fn field(&self, row: usize, name: &str) -> String;

    /// Number of repeated rows; negative counts mean none
    fn repeat_count(&self) -> i32;
}

/// [`FieldSource`] over the control, for one `(tr_code, issuing_name)` reply
pub struct ControlFields<'a> {
    control: &'a dyn BrokerControl,
    tr_code: &'a str,
    issuing_name: &'a str,
}

impl<'a> ControlFields<'a> {
    pub fn new(control: &'a dyn BrokerControl, tr_code: &'a str, issuing_name: &'a str) -> Self {
        Self {
            control,
            tr_code,
            issuing_name,
        }
    }
}

impl FieldSource for ControlFields<'_> {
    fn field(&self, row: usize, name: &str) -> String {
        let row = i32::try_from(row).unwrap_or(i32::MAX);
        self.control
            .get_comm_data(self.tr_code, self.issuing_name, row, name)
    }

    fn repeat_count(&self) -> i32 {
        self.control.get_repeat_count(self.tr_code, self.issuing_name)
    }
}

fn normalize(text: &str) -> String {
    text.trim().replace(',', "")
}

fn try_parse_i64(text: &str) -> Result<i64, ParseAnomaly> {
    normalize(text).parse::<i64>().map_err(|_| ParseAnomaly {
        text: text.to_string(),
    })
}

fn try_parse_f64(text: &str) -> Result<f64, ParseAnomaly> {
    normalize(text)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseAnomaly {
            text: text.to_string(),
        })
}

/// Parse integer text such as "1,250,000" or "-52000"; malformed reads as 0
pub fn parse_i64(text: &str) -> i64 {
    try_parse_i64(text).unwrap_or_else(|anomaly| {
        if !text.trim().is_empty() {
            debug!("{}", anomaly);
        }
        0
    })
}

/// Parse decimal text such as "+3.25"; malformed reads as 0.0
pub fn parse_f64(text: &str) -> f64 {
    try_parse_f64(text).unwrap_or_else(|anomaly| {
        if !text.trim().is_empty() {
            debug!("{}", anomaly);
        }
        0.0
    })
}

fn text(source: &dyn FieldSource, row: usize, name: &str) -> String {
    source.field(row, name).trim().to_string()
}

fn number(source: &dyn FieldSource, row: usize, name: &str) -> i64 {
    parse_i64(&source.field(row, name))
}

fn rows(source: &dyn FieldSource, limit: Option<usize>) -> usize {
    let count = usize::try_from(source.repeat_count()).unwrap_or(0);
    match limit {
        Some(limit) => count.min(limit),
        None => count,
    }
}

/// Order/cancel acknowledgement
pub fn parse_order_outcome(source: &dyn FieldSource) -> OrderOutcome {
    OrderOutcome {
        order_number: text(source, 0, order_fields::ORDER_NUMBER),
        state: text(source, 0, order_fields::STATE),
        quantity: number(source, 0, order_fields::QUANTITY),
        price: number(source, 0, order_fields::PRICE),
    }
}

/// opw00001
pub fn parse_orderable_funds(source: &dyn FieldSource) -> OrderableFunds {
    OrderableFunds {
        deposit: number(source, 0, fields::DEPOSIT),
        available_funds: number(source, 0, fields::AVAILABLE_FUNDS),
    }
}

/// opw00018
pub fn parse_holdings(source: &dyn FieldSource) -> Holdings {
    let rows = (0..rows(source, None))
        .map(|row| HoldingRow {
            code: text(source, row, fields::HOLDING_CODE),
            name: text(source, row, fields::STOCK_NAME),
            quantity: number(source, row, fields::HOLDING_QUANTITY),
            purchase_price: number(source, row, fields::PURCHASE_PRICE),
            current_price: number(source, row, fields::CURRENT_PRICE),
        })
        .collect();

    Holdings {
        total_investment: number(source, 0, fields::TOTAL_PURCHASE),
        rows,
    }
}

/// OPT10030, top [`RANKING_LIMIT`] rows in delivered order
pub fn parse_volume_ranking(source: &dyn FieldSource) -> Vec<RankedStock> {
    (0..rows(source, Some(RANKING_LIMIT)))
        .map(|row| RankedStock {
            code: text(source, row, fields::STOCK_CODE),
            name: text(source, row, fields::STOCK_NAME),
            price: number(source, row, fields::CURRENT_PRICE),
            volume: number(source, row, fields::VOLUME),
            amount: number(source, row, fields::TURNOVER),
        })
        .collect()
}

/// OPT10023, top [`RANKING_LIMIT`] rows in delivered order
pub fn parse_upsurge_ranking(source: &dyn FieldSource) -> Vec<UpsurgeStock> {
    (0..rows(source, Some(RANKING_LIMIT)))
        .map(|row| UpsurgeStock {
            code: text(source, row, fields::STOCK_CODE),
            name: text(source, row, fields::STOCK_NAME),
            price: number(source, row, fields::CURRENT_PRICE),
            previous_volume: number(source, row, fields::PREVIOUS_VOLUME),
            current_volume: number(source, row, fields::CURRENT_VOLUME),
            fluctuation_rate_text: text(source, row, fields::FLUCTUATION_RATE),
        })
        .collect()
}

/// Decode a TR reply by its code; `None` for codes the bridge does not issue
pub fn parse_tr(tr_code: &str, source: &dyn FieldSource) -> Option<TrResult> {
    match tr_code {
        TrCodes::ORDERABLE_FUNDS => Some(TrResult::OrderableFunds(parse_orderable_funds(source))),
        TrCodes::ACCOUNT_EVALUATION => Some(TrResult::Holdings(parse_holdings(source))),
        TrCodes::VOLUME_RANKING => Some(TrResult::VolumeRanking(parse_volume_ranking(source))),
        TrCodes::UPSURGE_RANKING => Some(TrResult::UpsurgeRanking(parse_upsurge_ranking(source))),
        _ => None,
    }
}
