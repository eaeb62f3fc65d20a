//! Synchronous trading facade
//!
//! Each operation issues one call on the control, blocks the calling thread on
//! the request's gate until the router resolves it (or the per-kind timeout
//! elapses), then returns a typed result:
//!
//! ```text
//! not connected ──► Err(NotConnected), nothing issued
//! connected ──► begin_request ──► send/submit ──► wait on gate ──► take result
//!                                     │                 │
//!                          nonzero code:          timeout: abandon slot,
//!                     Err(ImmediateSendFailure)     Err(RequestTimeout)
//! ```
//!
//! Every request is issued on a screen of its own from the [`ScreenPool`], so
//! the router can match a notification to the exact request it answers.
//!
//! Failures are reported to the [`FailureSink`] and returned as values; every
//! result type's `Default` is its fail-safe zero/empty value.

use kiwi_core::{
    AccountBalance, AccountInfo, Amount, Holdings, OrderAck, OrderAction, OrderOutcome, OrderType,
    Price, Quantity, RankedStock, Reply, Request, RequestId, RequestKind, Side, TrResult,
    UpsurgeStock,
};
use kiwi_ports::codes::{CANCEL_PRICE_TYPE, IssuingNames, Screens, TrCodes, fields, login_keys};
use kiwi_ports::{BrokerControl, FailureSink, OrderTicket};
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::config::BridgeConfig;
use crate::correlator::{LastResolution, RequestCorrelator};
use crate::error::{Result, TradingError};
use crate::gate::{Gate, GateStatus};
use crate::parser::parse_f64;
use crate::router::{CallbackRouter, RouterStats};
use crate::screens::ScreenPool;
use crate::sink::LogFailureSink;

pub struct TradingFacade {
    control: Arc<dyn BrokerControl>,
    correlator: Arc<RequestCorrelator>,
    router: Arc<CallbackRouter>,
    sink: Arc<dyn FailureSink>,
    config: BridgeConfig,
    screens: ScreenPool,
    /// Staged inputs are global to the control; staging and submission of one
    /// query must not interleave with another's
    submit_lock: Mutex<()>,
}

impl TradingFacade {
    /// Create a facade reporting failures through `log`
    pub fn new(control: Arc<dyn BrokerControl>, config: BridgeConfig) -> Self {
        Self::with_sink(control, config, Arc::new(LogFailureSink))
    }

    /// Create a facade with a custom failure sink
    ///
    /// Registers the facade's router as the control's notification receiver.
    pub fn with_sink(
        control: Arc<dyn BrokerControl>,
        config: BridgeConfig,
        sink: Arc<dyn FailureSink>,
    ) -> Self {
        let correlator = Arc::new(RequestCorrelator::new());
        let router = Arc::new(CallbackRouter::new(
            &control,
            correlator.clone(),
            sink.clone(),
        ));
        control.connect_events(router.clone());

        info!(
            "Trading facade ready (simulation: {}, sink: {})",
            config.simulation,
            sink.name()
        );

        Self {
            control,
            correlator,
            router,
            sink,
            config,
            screens: ScreenPool::default(),
            submit_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.control.is_connected()
    }

    pub fn router_stats(&self) -> RouterStats {
        self.router.stats()
    }

    /// Most recent notification seen, including late ones
    pub fn last_resolution(&self) -> Option<LastResolution> {
        self.correlator.last_resolution()
    }

    /// Requests currently registered with the correlator
    pub fn in_flight(&self) -> usize {
        self.correlator.in_flight()
    }

    // ------------------------------------------------------------------
    // Orders
    // ------------------------------------------------------------------

    /// Buy `quantity` shares of `code`; `price` is ignored by market orders
    pub fn buy(
        &self,
        code: &str,
        quantity: Quantity,
        price: Price,
        order_type: OrderType,
    ) -> Result<OrderAck> {
        let result = self.place_order(Side::Buy, code, quantity, price, order_type);
        self.report("BUY_ORDER", result)
    }

    /// Sell `quantity` shares of `code`
    pub fn sell(
        &self,
        code: &str,
        quantity: Quantity,
        price: Price,
        order_type: OrderType,
    ) -> Result<OrderAck> {
        let result = self.place_order(Side::Sell, code, quantity, price, order_type);
        self.report("SELL_ORDER", result)
    }

    /// Buy or sell with the order type given by name (`시장가`/`market`,
    /// `지정가`/`limit`); unknown names fail before anything is sent
    pub fn order(
        &self,
        side: Side,
        code: &str,
        quantity: Quantity,
        price: Price,
        order_type: &str,
    ) -> Result<OrderAck> {
        let result = order_type
            .parse::<OrderType>()
            .map_err(TradingError::from)
            .and_then(|order_type| self.place_order(side, code, quantity, price, order_type));
        let operation = match side {
            Side::Buy => "BUY_ORDER",
            Side::Sell => "SELL_ORDER",
        };
        self.report(operation, result)
    }

    /// Cancel `quantity` shares of the outstanding order `order_no`
    pub fn cancel(&self, order_no: &str, code: &str, quantity: Quantity) -> Result<OrderAck> {
        let result = self.cancel_order(order_no, code, quantity);
        self.report("CANCEL_ORDER", result)
    }

    fn place_order(
        &self,
        side: Side,
        code: &str,
        quantity: Quantity,
        price: Price,
        order_type: OrderType,
    ) -> Result<OrderAck> {
        self.ensure_connected()?;

        if self.config.simulation {
            info!(
                "Simulation mode: {} {} x{} not sent",
                side.as_str(),
                code,
                quantity
            );
            return Ok(OrderAck::Simulated);
        }

        let (issuing_name, screen) = match side {
            Side::Buy => (IssuingNames::BUY_ORDER, Screens::BUY_ORDER),
            Side::Sell => (IssuingNames::SELL_ORDER, Screens::SELL_ORDER),
        };
        let ticket = OrderTicket {
            issuing_name: issuing_name.to_string(),
            screen: self.screens.next(screen),
            account_no: self.config.account_no.clone(),
            action: side.new_order_action(),
            code: code.to_string(),
            quantity,
            price,
            price_type: order_type.price_type_code().to_string(),
            original_order_no: String::new(),
        };

        let outcome = self.submit_order(RequestKind::Order, &ticket)?;
        let amount = quantity.saturating_mul(price);
        info!(
            "TRADE side={} code={} qty={} price={} amount={} order_no={}",
            side.as_str(),
            code,
            quantity,
            price,
            amount,
            outcome.order_number
        );
        Ok(OrderAck::Confirmed(outcome))
    }

    fn cancel_order(&self, order_no: &str, code: &str, quantity: Quantity) -> Result<OrderAck> {
        self.ensure_connected()?;

        if self.config.simulation {
            info!("Simulation mode: cancel of {} not sent", order_no);
            return Ok(OrderAck::Simulated);
        }

        let ticket = OrderTicket {
            issuing_name: IssuingNames::CANCEL_ORDER.to_string(),
            screen: self.screens.next(Screens::CANCEL_ORDER),
            account_no: self.config.account_no.clone(),
            action: OrderAction::Cancel,
            code: code.to_string(),
            quantity,
            price: 0,
            price_type: CANCEL_PRICE_TYPE.to_string(),
            original_order_no: order_no.to_string(),
        };

        let outcome = self.submit_order(RequestKind::Cancel, &ticket)?;
        info!(
            "Cancel of {} acknowledged as {}",
            order_no, outcome.order_number
        );
        Ok(OrderAck::Confirmed(outcome))
    }

    /// Send an order and wait for its result; accepted iff an order number came back
    fn submit_order(&self, kind: RequestKind, ticket: &OrderTicket) -> Result<OrderOutcome> {
        let request = Request::order(kind, &ticket.issuing_name, &ticket.screen);
        let request_id = request.id;
        let key = ticket.issuing_name.clone();

        // Registered before sending so an immediate notification finds its slot
        let gate = self.correlator.begin_request(request)?;

        let code = self.control.send_order(ticket);
        if code != 0 {
            self.correlator.take(&key);
            return Err(TradingError::ImmediateSendFailure {
                operation: key,
                code,
            });
        }
        debug!("{} sent as request {}, awaiting result", key, request_id);

        let outcome = self
            .await_reply(&key, request_id, kind, &gate)?
            .into_order()
            .ok_or_else(|| TradingError::UnexpectedReply(key.clone()))?;

        if !outcome.is_accepted() {
            return Err(TradingError::OrderRejected {
                issuing_name: key,
                state: outcome.state,
            });
        }
        Ok(outcome)
    }

    // ------------------------------------------------------------------
    // TR queries
    // ------------------------------------------------------------------

    /// Orderable cash (opw00001)
    pub fn get_available_funds(&self) -> Result<Amount> {
        let result = self.available_funds();
        self.report("GET_AVAILABLE_FUNDS", result)
    }

    /// Account evaluation with positions (opw00018)
    pub fn get_holdings(&self) -> Result<Holdings> {
        let request = self.account_query(
            IssuingNames::HOLDINGS,
            TrCodes::ACCOUNT_EVALUATION,
            Screens::HOLDINGS,
            "1",
        );
        let result = self.holdings(request);
        self.report("GET_HOLDINGS", result)
    }

    /// Investment total (opw00018) and orderable cash (opw00001)
    pub fn get_account_funds(&self) -> Result<AccountBalance> {
        let result = self.available_funds().and_then(|available_funds| {
            let request = self.account_query(
                IssuingNames::ACCOUNT_EVALUATION,
                TrCodes::ACCOUNT_EVALUATION,
                Screens::ACCOUNT_EVALUATION,
                "1",
            );
            let holdings = self.holdings(request)?;
            Ok(AccountBalance {
                total_investment: holdings.total_investment,
                available_funds,
            })
        });
        self.report("GET_ACCOUNT_FUNDS", result)
    }

    /// Daily volume ranking, top 20 (OPT10030)
    pub fn get_top_volume_stocks(&self) -> Result<Vec<RankedStock>> {
        let request = Request::tr_query(
            IssuingNames::TOP_VOLUME,
            TrCodes::VOLUME_RANKING,
            self.screens.next(Screens::TOP_VOLUME),
        )
        .with_input("시장구분", "000")
        .with_input("정렬구분", "1")
        .with_input("관리종목포함", "0")
        .with_input("신용구분", "0")
        .with_input("거래량구분", "0")
        .with_input("가격구분", "0")
        .with_input("거래대금구분", "0")
        .with_input("장운영구분", "0");

        let result = self.query(request).and_then(|(key, result)| match result {
            TrResult::VolumeRanking(rows) => Ok(rows),
            _ => Err(TradingError::UnexpectedReply(key)),
        });
        self.report("GET_TOP_VOLUME", result)
    }

    /// Volume upsurge ranking, top 20 (OPT10023)
    pub fn get_top_upsurge_stocks(&self) -> Result<Vec<UpsurgeStock>> {
        let request = Request::tr_query(
            IssuingNames::TOP_UPSURGE,
            TrCodes::UPSURGE_RANKING,
            self.screens.next(Screens::TOP_UPSURGE),
        )
        .with_input("시장구분", "000")
        .with_input("정렬구분", "1")
        .with_input("시간구분", "2")
        .with_input("거래량구분", "5")
        .with_input("시간", "")
        .with_input("종목조건", "0")
        .with_input("가격구분", "0");

        let result = self.query(request).and_then(|(key, result)| match result {
            TrResult::UpsurgeRanking(rows) => Ok(rows),
            _ => Err(TradingError::UnexpectedReply(key)),
        });
        self.report("GET_TOP_UPSURGE", result)
    }

    fn available_funds(&self) -> Result<Amount> {
        let request = self.account_query(
            IssuingNames::AVAILABLE_FUNDS,
            TrCodes::ORDERABLE_FUNDS,
            Screens::AVAILABLE_FUNDS,
            "2",
        );
        match self.query(request)? {
            (_, TrResult::OrderableFunds(funds)) => Ok(funds.available_funds),
            (key, _) => Err(TradingError::UnexpectedReply(key)),
        }
    }

    fn holdings(&self, request: Request) -> Result<Holdings> {
        match self.query(request)? {
            (_, TrResult::Holdings(holdings)) => Ok(holdings),
            (key, _) => Err(TradingError::UnexpectedReply(key)),
        }
    }

    /// Account-scoped query with the configured credentials staged, on the
    /// next screen of the block at `base_screen`
    fn account_query(
        &self,
        issuing_name: &str,
        tr_code: &str,
        base_screen: &str,
        query_kind: &str,
    ) -> Request {
        Request::tr_query(issuing_name, tr_code, self.screens.next(base_screen))
            .with_input(fields::ACCOUNT_NO, self.config.account_no.as_str())
            .with_input(fields::PASSWORD, self.config.account_password.as_str())
            .with_input(fields::PASSWORD_MEDIA, "00")
            .with_input(fields::QUERY_KIND, query_kind)
    }

    /// Stage inputs, submit, wait; returns the correlation key with the result
    fn query(&self, request: Request) -> Result<(String, TrResult)> {
        self.ensure_connected()?;

        let key = request.key().to_string();
        let request_id = request.id;
        let tr_code = request.tr_code.clone().unwrap_or_default();
        let screen = request.screen.clone();
        let inputs = request.inputs.clone();

        let gate = self.correlator.begin_request(request)?;

        let code = {
            let _submit = self.submit_lock.lock();
            for (field, value) in &inputs {
                self.control.set_input_value(field, value);
            }
            self.control.comm_request_data(&key, &tr_code, 0, &screen)
        };
        if code != 0 {
            self.correlator.take(&key);
            return Err(TradingError::ImmediateSendFailure {
                operation: tr_code,
                code,
            });
        }
        debug!("{} submitted under {}, awaiting data", tr_code, key);

        let result = self
            .await_reply(&key, request_id, RequestKind::TrQuery, &gate)?
            .into_tr()
            .ok_or_else(|| TradingError::UnexpectedReply(key.clone()))?;
        Ok((key, result))
    }

    /// Wait on the gate within the kind's bound and take the result
    fn await_reply(
        &self,
        key: &str,
        request_id: RequestId,
        kind: RequestKind,
        gate: &Gate,
    ) -> Result<Reply> {
        let timeout = self.config.timeouts.for_kind(kind);

        match gate.wait(timeout) {
            GateStatus::Released => self
                .correlator
                .take(key)
                .ok_or_else(|| TradingError::MissingResult(key.to_string())),
            GateStatus::TimedOut => {
                self.correlator.abandon(key, request_id);
                Err(TradingError::RequestTimeout {
                    key: key.to_string(),
                    timeout,
                })
            }
        }
    }

    // ------------------------------------------------------------------
    // Master data and session
    // ------------------------------------------------------------------

    /// Last price from master data, fractions truncated; 0 when unavailable
    pub fn get_stock_price(&self, code: &str) -> Price {
        if let Err(err) = self.report("GET_STOCK_PRICE", self.ensure_connected()) {
            debug!("Price lookup for {} skipped: {}", code, err);
            return 0;
        }

        let price = parse_f64(&self.control.get_master_last_price(code)).trunc() as Price;
        if price > 0 {
            debug!("{} last price: {}", code, price);
            price
        } else {
            warn!("{} last price unavailable", code);
            0
        }
    }

    /// Stock name from master data; empty when unavailable
    pub fn get_stock_name(&self, code: &str) -> String {
        if let Err(err) = self.report("GET_STOCK_NAME", self.ensure_connected()) {
            debug!("Name lookup for {} skipped: {}", code, err);
            return String::new();
        }

        let name = self.control.get_master_code_name(code).trim().to_string();
        if name.is_empty() {
            warn!("{} name unavailable", code);
        } else {
            debug!("{} name: {}", code, name);
        }
        name
    }

    /// Login session metadata; the account number is the configured one
    pub fn get_account_info(&self) -> Result<AccountInfo> {
        let result = self.ensure_connected().map(|_| {
            let login = |key: &str| self.control.get_login_info(key).trim().to_string();
            AccountInfo {
                account_no: self.config.account_no.clone(),
                user_id: login(login_keys::USER_ID),
                user_name: login(login_keys::USER_NAME),
                server_kind: login(login_keys::SERVER_KIND),
                keyboard_security: login(login_keys::KEYBOARD_SECURITY),
                firewall: login(login_keys::FIREWALL),
            }
        });
        self.report("GET_ACCOUNT_INFO", result)
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.control.is_connected() {
            Ok(())
        } else {
            Err(TradingError::NotConnected)
        }
    }

    fn report<T>(&self, operation: &str, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            self.sink.report_failure(operation, &err.to_string());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimeoutConfig;
    use kiwi_ports::{BrokerEvents, TrDataEvent};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Control that answers on the calling thread, before the caller waits
    struct InlineControl {
        connected: bool,
        respond: AtomicBool,
        send_code: i32,
        fields: HashMap<String, String>,
        events: Mutex<Option<Arc<dyn BrokerEvents>>>,
        staged: Mutex<Vec<(String, String)>>,
        sent: Mutex<Vec<OrderTicket>>,
    }

    impl InlineControl {
        fn new(fields: &[(&str, &str)]) -> Self {
            Self {
                connected: true,
                respond: AtomicBool::new(true),
                send_code: 0,
                fields: fields
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                events: Mutex::new(None),
                staged: Mutex::new(Vec::new()),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn notify(&self, issuing_name: &str, tr_code: &str, screen: &str) {
            if !self.respond.load(Ordering::SeqCst) {
                return;
            }
            let events = self.events.lock().clone();
            if let Some(events) = events {
                events.on_receive_tr_data(&TrDataEvent {
                    screen: screen.to_string(),
                    issuing_name: issuing_name.to_string(),
                    tr_code: tr_code.to_string(),
                    ..Default::default()
                });
            }
        }
    }

    impl BrokerControl for InlineControl {
        fn is_connected(&self) -> bool {
            self.connected
        }
        fn connect_events(&self, events: Arc<dyn BrokerEvents>) {
            *self.events.lock() = Some(events);
        }
        fn send_order(&self, ticket: &OrderTicket) -> i32 {
            self.sent.lock().push(ticket.clone());
            if self.send_code != 0 {
                return self.send_code;
            }
            self.notify(&ticket.issuing_name, "", &ticket.screen);
            0
        }
        fn set_input_value(&self, field: &str, value: &str) {
            self.staged.lock().push((field.to_string(), value.to_string()));
        }
        fn comm_request_data(&self, name: &str, tr_code: &str, _: i32, screen: &str) -> i32 {
            if self.send_code != 0 {
                return self.send_code;
            }
            self.notify(name, tr_code, screen);
            0
        }
        fn get_comm_data(&self, _: &str, _: &str, _row: i32, field: &str) -> String {
            self.fields.get(field).cloned().unwrap_or_default()
        }
        fn get_repeat_count(&self, _: &str, _: &str) -> i32 {
            0
        }
        fn get_login_info(&self, key: &str) -> String {
            match key {
                login_keys::USER_ID => "trader01".to_string(),
                login_keys::SERVER_KIND => "1".to_string(),
                _ => String::new(),
            }
        }
        fn get_master_last_price(&self, code: &str) -> String {
            match code {
                "005930" => " 52,000".to_string(),
                "000660" => "182,000.0".to_string(),
                "035720" => "-".to_string(),
                _ => String::new(),
            }
        }
        fn get_master_code_name(&self, code: &str) -> String {
            match code {
                "005930" => "삼성전자 ".to_string(),
                _ => String::new(),
            }
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        reports: Mutex<Vec<String>>,
    }

    impl FailureSink for RecordingSink {
        fn report_failure(&self, operation: &str, _detail: &str) {
            self.reports.lock().push(operation.to_string());
        }
    }

    fn live_config() -> BridgeConfig {
        BridgeConfig::for_account("8012345611", "0000")
            .with_simulation(false)
            .with_timeouts(TimeoutConfig::uniform(200))
    }

    fn facade_with(
        control: InlineControl,
        config: BridgeConfig,
    ) -> (Arc<InlineControl>, Arc<RecordingSink>, TradingFacade) {
        let control = Arc::new(control);
        let sink = Arc::new(RecordingSink::default());
        let facade = TradingFacade::with_sink(control.clone(), config, sink.clone());
        (control, sink, facade)
    }

    #[test]
    fn test_not_connected_issues_nothing() {
        let mut control = InlineControl::new(&[]);
        control.connected = false;
        let (control, sink, facade) = facade_with(control, live_config());

        let result = facade.buy("005930", 10, 0, OrderType::Market);

        assert_eq!(result, Err(TradingError::NotConnected));
        assert!(control.sent.lock().is_empty());
        assert_eq!(*sink.reports.lock(), vec!["BUY_ORDER".to_string()]);
        assert_eq!(facade.get_available_funds().unwrap_or_default(), 0);
    }

    #[test]
    fn test_simulation_mode_skips_control() {
        let config = live_config().with_simulation(true);
        let (control, _sink, facade) = facade_with(InlineControl::new(&[]), config);

        assert_eq!(
            facade.sell("005930", 1, 52000, OrderType::Limit),
            Ok(OrderAck::Simulated)
        );
        assert_eq!(facade.cancel("0012345", "005930", 1), Ok(OrderAck::Simulated));
        assert!(control.sent.lock().is_empty());
    }

    #[test]
    fn test_buy_accepted_with_immediate_notification() {
        let control = InlineControl::new(&[("주문번호", "0012345"), ("주문수량", "10")]);
        let (control, sink, facade) = facade_with(control, live_config());

        let ack = facade.buy("005930", 10, 0, OrderType::Market).unwrap();

        assert_eq!(ack.order_number(), Some("0012345"));
        assert_eq!(facade.in_flight(), 0);
        assert!(sink.reports.lock().is_empty());

        let sent = control.sent.lock();
        assert_eq!(sent[0].issuing_name, IssuingNames::BUY_ORDER);
        assert_eq!(sent[0].action, OrderAction::NewBuy);
        assert_eq!(sent[0].price_type, "1");
        assert_eq!(sent[0].account_no, "8012345611");
    }

    #[test]
    fn test_empty_order_number_is_rejection() {
        let control = InlineControl::new(&[("주문번호", "  "), ("주문상태", "거부")]);
        let (_control, sink, facade) = facade_with(control, live_config());

        let result = facade.sell("005930", 1, 52000, OrderType::Limit);

        assert_eq!(
            result,
            Err(TradingError::OrderRejected {
                issuing_name: IssuingNames::SELL_ORDER.to_string(),
                state: "거부".to_string(),
            })
        );
        assert_eq!(*sink.reports.lock(), vec!["SELL_ORDER".to_string()]);
    }

    #[test]
    fn test_order_type_by_name() {
        let control = InlineControl::new(&[("주문번호", "0000042")]);
        let (control, sink, facade) = facade_with(control, live_config());

        let ack = facade.order(Side::Sell, "005930", 2, 53000, "지정가").unwrap();
        assert_eq!(ack.order_number(), Some("0000042"));
        assert_eq!(control.sent.lock()[0].price_type, "00");

        let result = facade.order(Side::Buy, "005930", 2, 0, "조건부지정가");
        assert_eq!(
            result,
            Err(TradingError::UnsupportedOrderType("조건부지정가".to_string()))
        );
        assert_eq!(control.sent.lock().len(), 1);
        assert_eq!(*sink.reports.lock(), vec!["BUY_ORDER".to_string()]);
    }

    #[test]
    fn test_immediate_failure_frees_key() {
        let mut control = InlineControl::new(&[]);
        control.send_code = -308;
        let (control, _sink, facade) = facade_with(control, live_config());

        let result = facade.cancel("0012345", "005930", 3);

        assert!(matches!(
            result,
            Err(TradingError::ImmediateSendFailure { code: -308, .. })
        ));
        assert_eq!(facade.in_flight(), 0);
        let sent = control.sent.lock();
        assert_eq!(sent[0].original_order_no, "0012345");
        assert_eq!(sent[0].price_type, CANCEL_PRICE_TYPE);
    }

    #[test]
    fn test_timeout_abandons_request() {
        let control = InlineControl::new(&[]);
        control.respond.store(false, Ordering::SeqCst);
        let (_control, sink, facade) = facade_with(control, live_config());

        let result = facade.get_holdings();

        assert!(matches!(result, Err(TradingError::RequestTimeout { .. })));
        assert_eq!(facade.in_flight(), 0);
        assert_eq!(*sink.reports.lock(), vec!["GET_HOLDINGS".to_string()]);
    }

    #[test]
    fn test_available_funds_stages_account_inputs() {
        let control = InlineControl::new(&[("예수금", "2,000,000"), ("주문가능금액", "1,250,000")]);
        let (control, _sink, facade) = facade_with(control, live_config());

        assert_eq!(facade.get_available_funds(), Ok(1_250_000));

        let staged = control.staged.lock();
        assert!(staged.contains(&("계좌번호".to_string(), "8012345611".to_string())));
        assert!(staged.contains(&("비밀번호입력매체구분".to_string(), "00".to_string())));
        assert!(staged.contains(&("조회구분".to_string(), "2".to_string())));
    }

    #[test]
    fn test_master_data_lookups() {
        let (_control, _sink, facade) = facade_with(InlineControl::new(&[]), live_config());

        assert_eq!(facade.get_stock_price("005930"), 52000);
        assert_eq!(facade.get_stock_price("000660"), 182000);
        assert_eq!(facade.get_stock_price("035720"), 0);
        assert_eq!(facade.get_stock_price("999999"), 0);
        assert_eq!(facade.get_stock_name("005930"), "삼성전자");
        assert_eq!(facade.get_stock_name("999999"), "");
    }

    #[test]
    fn test_account_info_uses_configured_account() {
        let (_control, _sink, facade) = facade_with(InlineControl::new(&[]), live_config());

        let info = facade.get_account_info().unwrap();

        assert_eq!(info.account_no, "8012345611");
        assert_eq!(info.user_id, "trader01");
        assert!(info.is_mock_server());
    }

    #[test]
    fn test_silent_request_does_not_block_the_name() {
        let control = InlineControl::new(&[("총매입금액", "1,000")]);
        control.respond.store(false, Ordering::SeqCst);
        let (control, _sink, facade) = facade_with(control, live_config());

        assert!(matches!(
            facade.get_holdings(),
            Err(TradingError::RequestTimeout { .. })
        ));

        control.respond.store(true, Ordering::SeqCst);
        let holdings = facade.get_holdings().unwrap();
        assert_eq!(holdings.total_investment, 1_000);
        assert_eq!(facade.in_flight(), 0);
    }

    #[test]
    fn test_each_order_gets_its_own_screen() {
        let control = InlineControl::new(&[("주문번호", "0000042")]);
        let (control, _sink, facade) = facade_with(control, live_config());

        facade.buy("005930", 1, 0, OrderType::Market).unwrap();
        facade.buy("005930", 1, 0, OrderType::Market).unwrap();
        facade.cancel("0000042", "005930", 1).unwrap();

        let sent = control.sent.lock();
        assert_eq!(sent[0].screen, Screens::BUY_ORDER);
        assert_ne!(sent[0].screen, sent[1].screen);
        assert_eq!(sent[2].screen, Screens::CANCEL_ORDER);
    }

    #[test]
    fn test_huge_order_amount_does_not_panic() {
        let control = InlineControl::new(&[("주문번호", "0000001")]);
        let (control, _sink, facade) = facade_with(control, live_config());

        let ack = facade
            .buy("005930", 4_000_000_000, 4_000_000_000, OrderType::Limit)
            .unwrap();

        assert_eq!(ack.order_number(), Some("0000001"));
        assert_eq!(control.sent.lock().len(), 1);
    }
}
