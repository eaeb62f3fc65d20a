//! Session - exercise every facade operation once and collect the outcomes

use kiwi_core::{OrderType, Side};
use kiwi_gateway::{TradingError, TradingFacade};
use log::{info, warn};

/// Outcome of a demo session
#[derive(Debug, Default)]
pub struct SessionReport {
    pub succeeded: Vec<&'static str>,
    pub failed: Vec<(&'static str, TradingError)>,
}

impl SessionReport {
    fn record<T>(&mut self, step: &'static str, result: Result<T, TradingError>) -> Option<T> {
        match result {
            Ok(value) => {
                self.succeeded.push(step);
                Some(value)
            }
            Err(err) => {
                warn!("{} failed: {}", step, err);
                self.failed.push((step, err));
                None
            }
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Run the demo session against `facade`, trading `code`
pub fn run_session(facade: &TradingFacade, code: &str) -> SessionReport {
    let mut report = SessionReport::default();

    if let Some(account) = report.record("account_info", facade.get_account_info()) {
        info!(
            "Logged in as {} ({}) on {} server, account {}",
            account.user_name,
            account.user_id,
            if account.is_mock_server() { "mock" } else { "live" },
            account.account_no
        );
    }

    let name = facade.get_stock_name(code);
    let price = facade.get_stock_price(code);
    info!("{} {}: last price {}", code, name, price);

    if let Some(funds) = report.record("available_funds", facade.get_available_funds()) {
        info!("Orderable cash: {}", funds);
    }

    if let Some(holdings) = report.record("holdings", facade.get_holdings()) {
        info!(
            "Holdings: {} positions, invested {}",
            holdings.rows.len(),
            holdings.total_investment
        );
        for row in &holdings.rows {
            info!(
                "  {} {} x{} @ {} (now {}, value {})",
                row.code,
                row.name,
                row.quantity,
                row.purchase_price,
                row.current_price,
                row.market_value()
            );
        }
    }

    if let Some(balance) = report.record("account_funds", facade.get_account_funds()) {
        info!(
            "Balance: invested {}, orderable {}",
            balance.total_investment, balance.available_funds
        );
    }

    if let Some(ranking) = report.record("top_volume", facade.get_top_volume_stocks()) {
        for (rank, stock) in ranking.iter().enumerate() {
            info!("  volume #{} {} {} {}", rank + 1, stock.code, stock.name, stock.volume);
        }
    }

    if let Some(ranking) = report.record("top_upsurge", facade.get_top_upsurge_stocks()) {
        for (rank, stock) in ranking.iter().enumerate() {
            info!(
                "  upsurge #{} {} {} {:+.2}%",
                rank + 1,
                stock.code,
                stock.name,
                stock.fluctuation_rate()
            );
        }
    }

    report.record("buy", facade.buy(code, 1, 0, OrderType::Market));

    let sell = report.record("sell", facade.order(Side::Sell, code, 1, price, "지정가"));
    if let Some(order_no) = sell.as_ref().and_then(|ack| ack.order_number()) {
        report.record("cancel", facade.cancel(order_no, code, 1));
    }

    let stats = facade.router_stats();
    info!(
        "Session done: {} ok, {} failed (notifications: {} tr, {} msg, {} chejan, {} dropped)",
        report.succeeded.len(),
        report.failed.len(),
        stats.tr_data,
        stats.messages,
        stats.chejan,
        stats.dropped
    );
    report
}
