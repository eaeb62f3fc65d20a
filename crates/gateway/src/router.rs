//! Callback router
//!
//! Receives every notification the control emits, on the control's own
//! dispatch context, and routes it by kind, issuing name and screen:
//!
//! ```text
//! OnReceiveChejanData ──► classify, log
//! OnReceiveMsg ─────────► classify, log
//! OnReceiveTrData ──┬───► BuyOrder/SellOrder/CancelOrder ─► parse_order_outcome ─┐
//!                   └───► any other name ─► parse_tr(tr_code) ────────────────────┴─► correlator.resolve
//! ```
//!
//! A TR notification is only decoded when its name and screen belong to a
//! pending or abandoned request; anything else is counted and dropped.
//! Decoded notifications always end in a resolve: the parse runs under a
//! [`ResolveGuard`](crate::correlator::ResolveGuard) and `catch_unwind`, so a
//! failing parser releases the waiting caller with no result instead of
//! leaving it blocked.

use kiwi_core::{ChejanKind, MessageClass, Reply};
use kiwi_ports::codes::IssuingNames;
use kiwi_ports::{BrokerControl, BrokerEvents, FailureSink, TrDataEvent};
use log::{debug, error, info, warn};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use crate::correlator::RequestCorrelator;
use crate::parser::{ControlFields, parse_order_outcome, parse_tr};

/// Notification counters
#[derive(Debug, Default)]
struct Counters {
    chejan: AtomicU64,
    messages: AtomicU64,
    tr_data: AtomicU64,
    dropped: AtomicU64,
    parse_failures: AtomicU64,
}

/// Snapshot of [`CallbackRouter`] counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterStats {
    pub chejan: u64,
    pub messages: u64,
    pub tr_data: u64,
    /// TR notifications no request was waiting for
    pub dropped: u64,
    pub parse_failures: u64,
}

pub struct CallbackRouter {
    /// Weak: the control owns the router through `connect_events`
    control: Weak<dyn BrokerControl>,
    correlator: Arc<RequestCorrelator>,
    sink: Arc<dyn FailureSink>,
    counters: Counters,
}

impl CallbackRouter {
    pub fn new(
        control: &Arc<dyn BrokerControl>,
        correlator: Arc<RequestCorrelator>,
        sink: Arc<dyn FailureSink>,
    ) -> Self {
        Self {
            control: Arc::downgrade(control),
            correlator,
            sink,
            counters: Counters::default(),
        }
    }

    pub fn stats(&self) -> RouterStats {
        RouterStats {
            chejan: self.counters.chejan.load(Ordering::Relaxed),
            messages: self.counters.messages.load(Ordering::Relaxed),
            tr_data: self.counters.tr_data.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
            parse_failures: self.counters.parse_failures.load(Ordering::Relaxed),
        }
    }

    /// Decode the reply being delivered; `None` if it cannot be read
    fn decode(&self, event: &TrDataEvent) -> Option<Reply> {
        let Some(control) = self.control.upgrade() else {
            warn!(
                "Control dropped before TR data under {} could be read",
                event.issuing_name
            );
            return None;
        };
        let source = ControlFields::new(control.as_ref(), &event.tr_code, &event.issuing_name);

        if IssuingNames::is_order(&event.issuing_name) {
            let outcome = parse_order_outcome(&source);
            debug!(
                "Order result under {}: number={:?} state={:?}",
                event.issuing_name, outcome.order_number, outcome.state
            );
            return Some(Reply::Order(outcome));
        }

        match parse_tr(&event.tr_code, &source) {
            Some(result) => {
                debug!(
                    "TR {} under {}: {} rows",
                    event.tr_code,
                    event.issuing_name,
                    result.row_count()
                );
                Some(Reply::Tr(result))
            }
            None => {
                warn!(
                    "Unsupported TR code {} under {}",
                    event.tr_code, event.issuing_name
                );
                None
            }
        }
    }
}

impl BrokerEvents for CallbackRouter {
    fn on_receive_chejan_data(&self, gubun: &str, item_count: i32, fid_list: &str) {
        self.counters.chejan.fetch_add(1, Ordering::Relaxed);

        let kind = ChejanKind::from_gubun(gubun);
        debug!(
            "Chejan notification: {} ({} items, fids {})",
            kind.as_str(),
            item_count,
            fid_list
        );
    }

    fn on_receive_msg(&self, screen: &str, issuing_name: &str, tr_code: &str, text: &str) {
        self.counters.messages.fetch_add(1, Ordering::Relaxed);

        info!(
            "Broker message [{} {} {}]: {}",
            screen, issuing_name, tr_code, text
        );
        match MessageClass::classify(text) {
            MessageClass::OrderSucceeded => info!("Order under {} processed", issuing_name),
            MessageClass::OrderFailed => error!("Order under {} failed: {}", issuing_name, text),
            MessageClass::OrderOther | MessageClass::Other => {}
        }
    }

    fn on_receive_tr_data(&self, event: &TrDataEvent) {
        self.counters.tr_data.fetch_add(1, Ordering::Relaxed);
        let key = event.issuing_name.as_str();

        if !event.error_code.trim().is_empty() && event.error_code.trim() != "0" {
            debug!(
                "TR data under {} carries error code {} ({})",
                key, event.error_code, event.message
            );
        }

        if !self.correlator.expects(key, &event.screen) {
            self.counters.dropped.fetch_add(1, Ordering::Relaxed);
            warn!(
                "Dropping TR data under {} on screen {:?} ({}): no request waiting",
                key, event.screen, event.tr_code
            );
            return;
        }

        let guard = self.correlator.guard(key, event.screen.as_str());
        match panic::catch_unwind(AssertUnwindSafe(|| self.decode(event))) {
            Ok(reply) => {
                guard.complete(reply);
            }
            Err(_) => {
                self.counters.parse_failures.fetch_add(1, Ordering::Relaxed);
                self.sink.report_failure(
                    "TR_DATA",
                    &format!("decoding {} under {} panicked", event.tr_code, key),
                );
                guard.complete(None);
            }
        }
    }
}
