use kiwi_core::OrderAction;
use kiwi_ports::codes::order_fields;
use kiwi_ports::{BrokerControl, BrokerEvents, OrderTicket, TrDataEvent};
use log::{debug, error, info, warn};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};

use crate::dispatch::{self, Dispatch, Notification};
use crate::error::{Result, SimError};
use crate::model::{OrderScript, ScriptedRecord, TrScript, result_codes};

/// Simulator settings
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Delay between a submission and its notifications
    pub latency: Duration,
    pub connected: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(5),
            connected: true,
        }
    }
}

/// Call counters
#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub orders: AtomicU64,
    pub queries: AtomicU64,
    pub inputs: AtomicU64,
    pub notifications: AtomicU64,
}

/// Snapshot of the simulator's call counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimCounters {
    pub orders: u64,
    pub queries: u64,
    pub inputs: u64,
    pub notifications: u64,
}

/// State shared with the dispatch thread
pub(crate) struct SimState {
    pub events: RwLock<Option<Arc<dyn BrokerEvents>>>,
    /// Replies being delivered, by issuing name
    pub active: Mutex<HashMap<String, ScriptedRecord>>,
    pub counters: Counters,
}

pub struct SimulatedControl {
    state: Arc<SimState>,
    tx: UnboundedSender<Dispatch>,
    latency: Duration,
    connected: AtomicBool,
    order_seq: AtomicU64,
    order_script: Mutex<OrderScript>,
    tr_scripts: Mutex<HashMap<String, TrScript>>,
    /// Code -> (name, last price text)
    master: Mutex<HashMap<String, (String, String)>>,
    login: Mutex<HashMap<String, String>>,
    staged: Mutex<Vec<(String, String)>>,
    submitted_inputs: Mutex<HashMap<String, Vec<(String, String)>>>,
    /// Issuing name -> screen of its most recent submission
    submitted_screens: Mutex<HashMap<String, String>>,
    sent_orders: Mutex<Vec<OrderTicket>>,
}

impl SimulatedControl {
    pub fn new() -> Result<Self> {
        Self::with_config(SimConfig::default())
    }

    /// Start the dispatch thread and return the control
    pub fn with_config(config: SimConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        let (tx, rx) = unbounded_channel();

        let state = Arc::new(SimState {
            events: RwLock::new(None),
            active: Mutex::new(HashMap::new()),
            counters: Counters::default(),
        });

        let loop_state = state.clone();
        thread::Builder::new()
            .name("kiwi-sim-dispatch".to_string())
            .spawn(move || runtime.block_on(dispatch::run(loop_state, rx)))?;

        info!(
            "Simulated control started (latency {:?}, connected: {})",
            config.latency, config.connected
        );

        Ok(Self {
            state,
            tx,
            latency: config.latency,
            connected: AtomicBool::new(config.connected),
            order_seq: AtomicU64::new(0),
            order_script: Mutex::new(OrderScript::default()),
            tr_scripts: Mutex::new(HashMap::new()),
            master: Mutex::new(HashMap::new()),
            login: Mutex::new(HashMap::new()),
            staged: Mutex::new(Vec::new()),
            submitted_inputs: Mutex::new(HashMap::new()),
            submitted_screens: Mutex::new(HashMap::new()),
            sent_orders: Mutex::new(Vec::new()),
        })
    }

    // ------------------------------------------------------------------
    // Scripting
    // ------------------------------------------------------------------

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Behaviour of every following order
    pub fn script_orders(&self, script: OrderScript) {
        *self.order_script.lock() = script;
    }

    /// Behaviour of every following query for `tr_code`
    ///
    /// Unscripted codes answer with an empty record.
    pub fn script_tr(&self, tr_code: impl Into<String>, script: TrScript) {
        self.tr_scripts.lock().insert(tr_code.into(), script);
    }

    pub fn set_master(&self, code: &str, name: &str, last_price: &str) {
        self.master
            .lock()
            .insert(code.to_string(), (name.to_string(), last_price.to_string()));
    }

    pub fn set_login_info(&self, key: &str, value: &str) {
        self.login.lock().insert(key.to_string(), value.to_string());
    }

    /// Raise a TR notification on `screen` after `delay`, whether or not a
    /// request asked for it
    pub fn emit_tr_data(
        &self,
        issuing_name: &str,
        tr_code: &str,
        screen: &str,
        record: ScriptedRecord,
        delay: Duration,
    ) -> Result<()> {
        let event = tr_event(screen, issuing_name, tr_code);
        self.dispatch(delay, vec![Notification::TrData { event, record }])
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    pub fn counters(&self) -> SimCounters {
        let counters = &self.state.counters;
        SimCounters {
            orders: counters.orders.load(Ordering::Relaxed),
            queries: counters.queries.load(Ordering::Relaxed),
            inputs: counters.inputs.load(Ordering::Relaxed),
            notifications: counters.notifications.load(Ordering::Relaxed),
        }
    }

    pub fn sent_orders(&self) -> Vec<OrderTicket> {
        self.sent_orders.lock().clone()
    }

    /// Inputs staged for the most recent query under `issuing_name`
    pub fn submitted_inputs(&self, issuing_name: &str) -> Vec<(String, String)> {
        self.submitted_inputs
            .lock()
            .get(issuing_name)
            .cloned()
            .unwrap_or_default()
    }

    /// Screen of the most recent order or query under `issuing_name`
    pub fn last_screen(&self, issuing_name: &str) -> Option<String> {
        self.submitted_screens.lock().get(issuing_name).cloned()
    }

    fn record_screen(&self, issuing_name: &str, screen: &str) {
        self.submitted_screens
            .lock()
            .insert(issuing_name.to_string(), screen.to_string());
    }

    fn dispatch(&self, delay: Duration, notifications: Vec<Notification>) -> Result<()> {
        self.tx
            .send(Dispatch::Deliver {
                delay,
                notifications,
            })
            .map_err(|_| SimError::DispatchClosed)
    }

    fn order_notifications(&self, ticket: &OrderTicket, record: ScriptedRecord) -> Vec<Notification> {
        let tr_code = order_tr_code(ticket.action);
        let accepted = !record.field(0, order_fields::ORDER_NUMBER).trim().is_empty();

        let text = if accepted {
            format!("[00Z112] 모의투자 {}주문 성공", action_label(ticket.action))
        } else {
            format!(
                "[800033] 모의투자 {}주문 실패: 주문가능금액을 확인하세요",
                action_label(ticket.action)
            )
        };

        let mut notifications = vec![
            Notification::Msg {
                screen: ticket.screen.clone(),
                issuing_name: ticket.issuing_name.clone(),
                tr_code: tr_code.to_string(),
                text,
            },
            Notification::TrData {
                event: tr_event(&ticket.screen, &ticket.issuing_name, tr_code),
                record,
            },
        ];
        if accepted {
            notifications.push(Notification::Chejan {
                gubun: "0".to_string(),
                item_count: 9,
                fid_list: "9201;9203;9205;9001;912;913;302;900;901".to_string(),
            });
        }
        notifications
    }

    fn order_record(&self, ticket: &OrderTicket, state: &str, accepted: bool) -> ScriptedRecord {
        let order_number = if accepted {
            format!("{:07}", self.order_seq.fetch_add(1, Ordering::SeqCst) + 1)
        } else {
            String::new()
        };
        ScriptedRecord::new()
            .with_field(order_fields::ORDER_NUMBER, order_number)
            .with_field(order_fields::STATE, state)
            .with_field(order_fields::QUANTITY, ticket.quantity.to_string())
            .with_field(order_fields::PRICE, ticket.price.to_string())
    }
}

impl Drop for SimulatedControl {
    fn drop(&mut self) {
        let _ = self.tx.send(Dispatch::Shutdown);
    }
}

impl BrokerControl for SimulatedControl {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn connect_events(&self, events: Arc<dyn BrokerEvents>) {
        *self.state.events.write() = Some(events);
    }

    fn send_order(&self, ticket: &OrderTicket) -> i32 {
        self.state.counters.orders.fetch_add(1, Ordering::Relaxed);
        self.sent_orders.lock().push(ticket.clone());
        self.record_screen(&ticket.issuing_name, &ticket.screen);

        if !self.is_connected() {
            return result_codes::CONNECT;
        }

        let script = self.order_script.lock().clone();
        let (delay, record) = match script {
            OrderScript::Accept => (self.latency, self.order_record(ticket, "접수", true)),
            OrderScript::Delayed(delay) => (delay, self.order_record(ticket, "접수", true)),
            OrderScript::Reject(state) => (self.latency, self.order_record(ticket, &state, false)),
            OrderScript::Fail(code) => {
                debug!("{} refused with {}", ticket.issuing_name, code);
                return code;
            }
            OrderScript::Silent => {
                debug!("{} accepted, no answer will follow", ticket.issuing_name);
                return result_codes::OK;
            }
        };

        let notifications = self.order_notifications(ticket, record);
        match self.dispatch(delay, notifications) {
            Ok(()) => result_codes::OK,
            Err(err) => {
                error!("{} not delivered: {}", ticket.issuing_name, err);
                result_codes::CONNECT
            }
        }
    }

    fn set_input_value(&self, field: &str, value: &str) {
        self.state.counters.inputs.fetch_add(1, Ordering::Relaxed);
        self.staged
            .lock()
            .push((field.to_string(), value.to_string()));
    }

    fn comm_request_data(
        &self,
        issuing_name: &str,
        tr_code: &str,
        prev_next: i32,
        screen: &str,
    ) -> i32 {
        self.state.counters.queries.fetch_add(1, Ordering::Relaxed);
        let inputs = std::mem::take(&mut *self.staged.lock());
        self.submitted_inputs
            .lock()
            .insert(issuing_name.to_string(), inputs);
        self.record_screen(issuing_name, screen);

        if !self.is_connected() {
            return result_codes::CONNECT;
        }
        if prev_next != 0 {
            warn!("{} requested continuation data, serving the first page", tr_code);
        }

        let script = self
            .tr_scripts
            .lock()
            .get(tr_code)
            .cloned()
            .unwrap_or_else(|| TrScript::Reply(ScriptedRecord::new()));
        let (delay, record) = match script {
            TrScript::Reply(record) => (self.latency, record),
            TrScript::Delayed(record, delay) => (delay, record),
            TrScript::Fail(code) => {
                debug!("{} under {} refused with {}", tr_code, issuing_name, code);
                return code;
            }
            TrScript::Silent => {
                debug!("{} under {} accepted, no answer will follow", tr_code, issuing_name);
                return result_codes::OK;
            }
        };

        let event = tr_event(screen, issuing_name, tr_code);
        match self.dispatch(delay, vec![Notification::TrData { event, record }]) {
            Ok(()) => result_codes::OK,
            Err(err) => {
                error!("{} under {} not delivered: {}", tr_code, issuing_name, err);
                result_codes::CONNECT
            }
        }
    }

    fn get_comm_data(&self, _tr_code: &str, issuing_name: &str, row: i32, field: &str) -> String {
        self.state
            .active
            .lock()
            .get(issuing_name)
            .map(|record| record.field(row, field))
            .unwrap_or_default()
    }

    fn get_repeat_count(&self, _tr_code: &str, issuing_name: &str) -> i32 {
        self.state
            .active
            .lock()
            .get(issuing_name)
            .map(ScriptedRecord::repeat_count)
            .unwrap_or(0)
    }

    fn get_login_info(&self, key: &str) -> String {
        self.login.lock().get(key).cloned().unwrap_or_default()
    }

    fn get_master_last_price(&self, code: &str) -> String {
        self.master
            .lock()
            .get(code)
            .map(|(_, price)| price.clone())
            .unwrap_or_default()
    }

    fn get_master_code_name(&self, code: &str) -> String {
        self.master
            .lock()
            .get(code)
            .map(|(name, _)| name.clone())
            .unwrap_or_default()
    }
}

fn tr_event(screen: &str, issuing_name: &str, tr_code: &str) -> TrDataEvent {
    TrDataEvent {
        screen: screen.to_string(),
        issuing_name: issuing_name.to_string(),
        tr_code: tr_code.to_string(),
        record_name: tr_code.to_string(),
        prev_next: "0".to_string(),
        ..Default::default()
    }
}

fn order_tr_code(action: OrderAction) -> &'static str {
    match action {
        OrderAction::NewBuy => "KOA_NORMAL_BUY_KP_ORD",
        OrderAction::NewSell => "KOA_NORMAL_SELL_KP_ORD",
        OrderAction::Cancel => "KOA_NORMAL_KP_CANCEL",
    }
}

fn action_label(action: OrderAction) -> &'static str {
    match action {
        OrderAction::NewBuy => "매수",
        OrderAction::NewSell => "매도",
        OrderAction::Cancel => "취소",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiwi_ports::codes::{IssuingNames, TrCodes};
    use std::sync::Weak;
    use std::sync::mpsc::{Receiver, Sender, channel};

    /// Records what each callback could read while it ran
    struct EventLog {
        control: Weak<SimulatedControl>,
        seen: Mutex<Sender<String>>,
    }

    impl BrokerEvents for EventLog {
        fn on_receive_chejan_data(&self, gubun: &str, _item_count: i32, _fid_list: &str) {
            let _ = self.seen.lock().send(format!("chejan:{}", gubun));
        }

        fn on_receive_msg(&self, _screen: &str, issuing_name: &str, _tr_code: &str, _text: &str) {
            let _ = self.seen.lock().send(format!("msg:{}", issuing_name));
        }

        fn on_receive_tr_data(&self, event: &TrDataEvent) {
            let read = self
                .control
                .upgrade()
                .map(|c| {
                    c.get_comm_data(&event.tr_code, &event.issuing_name, 0, order_fields::ORDER_NUMBER)
                })
                .unwrap_or_default();
            let _ = self
                .seen
                .lock()
                .send(format!("tr:{}:{}", event.issuing_name, read));
        }
    }

    fn logged(config: SimConfig) -> (Arc<SimulatedControl>, Receiver<String>) {
        let control = Arc::new(SimulatedControl::with_config(config).unwrap());
        let (tx, rx) = channel();
        let events = Arc::new(EventLog {
            control: Arc::downgrade(&control),
            seen: Mutex::new(tx),
        });
        control.connect_events(events);
        (control, rx)
    }

    fn ticket(action: OrderAction, issuing_name: &str) -> OrderTicket {
        OrderTicket {
            issuing_name: issuing_name.to_string(),
            screen: "1000".to_string(),
            account_no: "8012345611".to_string(),
            action,
            code: "005930".to_string(),
            quantity: 10,
            price: 0,
            price_type: "1".to_string(),
            original_order_no: String::new(),
        }
    }

    fn next(rx: &Receiver<String>) -> String {
        rx.recv_timeout(Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn test_accepted_order_sequence() {
        let (control, rx) = logged(SimConfig::default());

        let code = control.send_order(&ticket(OrderAction::NewBuy, IssuingNames::BUY_ORDER));

        assert_eq!(code, result_codes::OK);
        assert_eq!(next(&rx), "msg:BuyOrder");
        assert_eq!(next(&rx), "tr:BuyOrder:0000001");
        assert_eq!(next(&rx), "chejan:0");

        control.send_order(&ticket(OrderAction::NewSell, IssuingNames::SELL_ORDER));
        assert_eq!(next(&rx), "msg:SellOrder");
        assert_eq!(next(&rx), "tr:SellOrder:0000002");
    }

    #[test]
    fn test_rejected_order_has_empty_number() {
        let (control, rx) = logged(SimConfig::default());
        control.script_orders(OrderScript::Reject("거부".to_string()));

        control.send_order(&ticket(OrderAction::NewBuy, IssuingNames::BUY_ORDER));

        assert_eq!(next(&rx), "msg:BuyOrder");
        assert_eq!(next(&rx), "tr:BuyOrder:");
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn test_immediate_failure_raises_nothing() {
        let (control, rx) = logged(SimConfig::default());
        control.script_orders(OrderScript::Fail(result_codes::ORDER_OVERFLOW));

        let code = control.send_order(&ticket(OrderAction::Cancel, IssuingNames::CANCEL_ORDER));

        assert_eq!(code, -308);
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
        assert_eq!(control.counters().orders, 1);
    }

    #[test]
    fn test_disconnected_control_refuses() {
        let (control, _rx) = logged(SimConfig {
            connected: false,
            ..Default::default()
        });

        assert_eq!(
            control.comm_request_data("AvailableFunds", TrCodes::ORDERABLE_FUNDS, 0, "2001"),
            result_codes::CONNECT
        );
    }

    #[test]
    fn test_query_consumes_staged_inputs() {
        let (control, rx) = logged(SimConfig::default());
        control.set_input_value("계좌번호", "8012345611");
        control.set_input_value("조회구분", "2");

        control.comm_request_data("AvailableFunds", TrCodes::ORDERABLE_FUNDS, 0, "2001");
        assert_eq!(next(&rx), "tr:AvailableFunds:");

        assert_eq!(
            control.submitted_inputs("AvailableFunds"),
            vec![
                ("계좌번호".to_string(), "8012345611".to_string()),
                ("조회구분".to_string(), "2".to_string()),
            ]
        );
        control.comm_request_data("AvailableFunds", TrCodes::ORDERABLE_FUNDS, 0, "2001");
        assert!(control.submitted_inputs("AvailableFunds").is_empty());
        assert_eq!(control.counters().inputs, 2);
    }

    #[test]
    fn test_reply_readable_only_during_callback() {
        let (control, rx) = logged(SimConfig::default());
        let record = ScriptedRecord::new().with_field(order_fields::ORDER_NUMBER, "77");

        control
            .emit_tr_data("Stray", "opt99999", "", record, Duration::ZERO)
            .unwrap();

        assert_eq!(next(&rx), "tr:Stray:77");
        assert_eq!(control.get_comm_data("opt99999", "Stray", 0, order_fields::ORDER_NUMBER), "");
        assert_eq!(control.get_repeat_count("opt99999", "Stray"), 0);
    }

    #[test]
    fn test_submission_screens_are_recorded() {
        let (control, rx) = logged(SimConfig::default());
        assert_eq!(control.last_screen(IssuingNames::BUY_ORDER), None);

        control.send_order(&ticket(OrderAction::NewBuy, IssuingNames::BUY_ORDER));
        control.comm_request_data("AvailableFunds", TrCodes::ORDERABLE_FUNDS, 0, "2003");
        control.comm_request_data("AvailableFunds", TrCodes::ORDERABLE_FUNDS, 0, "2004");

        assert_eq!(control.last_screen(IssuingNames::BUY_ORDER).as_deref(), Some("1000"));
        assert_eq!(control.last_screen("AvailableFunds").as_deref(), Some("2004"));
        assert_eq!(next(&rx), "msg:BuyOrder");
    }

    #[test]
    fn test_master_and_login_data() {
        let control = SimulatedControl::new().unwrap();
        control.set_master("005930", "삼성전자", "52000");
        control.set_login_info("USER_ID", "trader01");

        assert_eq!(control.get_master_code_name("005930"), "삼성전자");
        assert_eq!(control.get_master_last_price("005930"), "52000");
        assert_eq!(control.get_master_last_price("000000"), "");
        assert_eq!(control.get_login_info("USER_ID"), "trader01");
    }
}
