//! Request correlation
//!
//! Maps each in-flight request, keyed by the name it was issued under, to its
//! gate and result buffer. Callers register with [`RequestCorrelator::begin_request`]
//! and wait on the returned gate; the notification context stores the parsed
//! reply with [`RequestCorrelator::resolve`], which releases the gate.
//!
//! A notification only resolves a slot when it carries the screen the slot's
//! request was issued on. Requests that time out are abandoned: their slot is
//! removed at once, so the name can be reused, and their screen is remembered
//! until its notification turns up or the screen is issued again. A late
//! notification is recognised by that screen and dropped.
//!
//! Slot and abandonment state share one lock, so resolution and abandonment
//! of the same request are never interleaved.

use chrono::{DateTime, Utc};
use kiwi_core::{Reply, Request, RequestId};
use log::{debug, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::time::Instant;
use thiserror::Error;

use crate::gate::Gate;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CorrelationError {
    #[error("Request already in flight under name: {0}")]
    AlreadyInFlight(String),
}

/// What a call to [`RequestCorrelator::resolve`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Result stored and gate released
    Resolved,
    /// The slot was already resolved; notification ignored
    Duplicate,
    /// Carried the screen of an abandoned request; kept only as last-seen result
    Late,
    /// No request is waiting under this name and screen; notification ignored
    Unmatched,
}

/// Most recent notification seen by the correlator, kept for diagnostics
#[derive(Debug, Clone)]
pub struct LastResolution {
    pub key: String,
    pub screen: String,
    pub request_id: Option<RequestId>,
    pub reply: Option<Reply>,
    pub resolved_at: DateTime<Utc>,
    /// Arrived after its request had been abandoned
    pub late: bool,
}

struct PendingSlot {
    request: Request,
    gate: Gate,
    result: Option<Reply>,
    resolved: bool,
    issued_at: Instant,
}

struct AbandonedRequest {
    key: String,
    request_id: RequestId,
    abandoned_at: Instant,
}

#[derive(Default)]
struct Book {
    slots: HashMap<String, PendingSlot>,
    /// Keyed by screen
    abandoned: HashMap<String, AbandonedRequest>,
    last: Option<LastResolution>,
}

impl Book {
    fn record(
        &mut self,
        key: &str,
        screen: &str,
        request_id: Option<RequestId>,
        reply: Option<Reply>,
        late: bool,
    ) {
        self.last = Some(LastResolution {
            key: key.to_string(),
            screen: screen.to_string(),
            request_id,
            reply,
            resolved_at: Utc::now(),
            late,
        });
    }

    fn abandoned_under(&self, key: &str, screen: &str) -> bool {
        self.abandoned
            .get(screen)
            .is_some_and(|abandoned| abandoned.key == key)
    }
}

#[derive(Default)]
pub struct RequestCorrelator {
    book: Mutex<Book>,
}

impl RequestCorrelator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a request and get the gate to wait on
    ///
    /// Fails if a request under the same name has not been taken yet.
    pub fn begin_request(&self, request: Request) -> Result<Gate, CorrelationError> {
        let mut book = self.book.lock();
        let key = request.issuing_name.clone();

        if book.slots.contains_key(&key) {
            return Err(CorrelationError::AlreadyInFlight(key));
        }

        if let Some(stale) = book.abandoned.remove(&request.screen) {
            warn!(
                "Screen {} reissued while abandoned request {} under {} never answered ({:?} ago)",
                request.screen,
                stale.request_id,
                stale.key,
                stale.abandoned_at.elapsed()
            );
        }

        debug!(
            "Begin {} request {} under {} on screen {}",
            request.kind.as_str(),
            request.id,
            key,
            request.screen
        );
        let gate = Gate::new();
        book.slots.insert(
            key,
            PendingSlot {
                request,
                gate: gate.clone(),
                result: None,
                resolved: false,
                issued_at: Instant::now(),
            },
        );
        Ok(gate)
    }

    /// Store the reply for `key` and release its gate
    ///
    /// Only a notification on the pending request's own `screen` resolves it.
    /// `None` releases the gate without a result (the caller treats that as an
    /// anomaly). Never fails; the returned [`Resolution`] says what happened.
    pub fn resolve(&self, key: &str, screen: &str, reply: Option<Reply>) -> Resolution {
        let mut book = self.book.lock();

        if let Some(slot) = book
            .slots
            .get_mut(key)
            .filter(|slot| slot.request.screen == screen)
        {
            if slot.resolved {
                warn!(
                    "Request {} under {} already resolved, duplicate notification dropped",
                    slot.request.id, key
                );
                return Resolution::Duplicate;
            }

            slot.result = reply.clone();
            slot.resolved = true;
            slot.gate.release();
            let request_id = slot.request.id;
            debug!(
                "Resolved request {} under {} after {:?}",
                request_id,
                key,
                slot.issued_at.elapsed()
            );

            book.record(key, screen, Some(request_id), reply, false);
            return Resolution::Resolved;
        }

        if let Entry::Occupied(entry) = book.abandoned.entry(screen.to_string()) {
            if entry.get().key == key {
                let abandoned = entry.remove();
                warn!(
                    "Late notification under {} on screen {} for request {} abandoned {:?} ago, dropped",
                    key,
                    screen,
                    abandoned.request_id,
                    abandoned.abandoned_at.elapsed()
                );
                book.record(key, screen, Some(abandoned.request_id), reply, true);
                return Resolution::Late;
            }
        }

        warn!(
            "No pending request under {} on screen {:?}, notification dropped",
            key, screen
        );
        Resolution::Unmatched
    }

    /// Remove the slot for `key` and return its result
    ///
    /// Call after the gate has been released. `None` means the gate was
    /// released without a result.
    pub fn take(&self, key: &str) -> Option<Reply> {
        self.book
            .lock()
            .slots
            .remove(key)
            .and_then(|slot| slot.result)
    }

    /// Give up on a request whose wait timed out
    ///
    /// Only removes the slot if it still belongs to `request_id`. Returns `true`
    /// if the request was still unanswered, in which case its screen is kept to
    /// recognise the late notification.
    pub fn abandon(&self, key: &str, request_id: RequestId) -> bool {
        let mut book = self.book.lock();

        let slot = match book.slots.entry(key.to_string()) {
            Entry::Occupied(entry) if entry.get().request.id == request_id => entry.remove(),
            _ => return false,
        };

        if slot.resolved {
            // Notification raced the timeout; nothing more will arrive
            debug!(
                "Request {} under {} resolved after its caller gave up",
                request_id, key
            );
            return false;
        }

        warn!(
            "Abandoning request {} under {} on screen {} after {:?}",
            request_id,
            key,
            slot.request.screen,
            slot.issued_at.elapsed()
        );
        book.abandoned.insert(
            slot.request.screen,
            AbandonedRequest {
                key: key.to_string(),
                request_id,
                abandoned_at: Instant::now(),
            },
        );
        true
    }

    /// Whether a notification under `key` on `screen` belongs to a request,
    /// pending or abandoned
    pub fn expects(&self, key: &str, screen: &str) -> bool {
        let book = self.book.lock();
        let pending = book
            .slots
            .get(key)
            .is_some_and(|slot| !slot.resolved && slot.request.screen == screen);
        pending || book.abandoned_under(key, screen)
    }

    /// Scoped resolution for `key` on `screen`
    pub fn guard(&self, key: impl Into<String>, screen: impl Into<String>) -> ResolveGuard<'_> {
        ResolveGuard {
            correlator: self,
            key: key.into(),
            screen: screen.into(),
            completed: false,
        }
    }

    /// Number of slots not yet taken
    pub fn in_flight(&self) -> usize {
        self.book.lock().slots.len()
    }

    /// Number of abandoned requests still awaiting their notification
    pub fn abandoned_count(&self) -> usize {
        self.book.lock().abandoned.len()
    }

    pub fn last_resolution(&self) -> Option<LastResolution> {
        self.book.lock().last.clone()
    }
}

/// Resolves its key exactly once
///
/// Dropping the guard without [`ResolveGuard::complete`], including while
/// unwinding from a panic, resolves with no result so the waiting caller is
/// released.
pub struct ResolveGuard<'a> {
    correlator: &'a RequestCorrelator,
    key: String,
    screen: String,
    completed: bool,
}

impl ResolveGuard<'_> {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn complete(mut self, reply: Option<Reply>) -> Resolution {
        self.completed = true;
        self.correlator.resolve(&self.key, &self.screen, reply)
    }
}

impl Drop for ResolveGuard<'_> {
    fn drop(&mut self) {
        if !self.completed {
            self.correlator.resolve(&self.key, &self.screen, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::GateStatus;
    use kiwi_core::{OrderOutcome, OrderableFunds, RequestKind, TrResult};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    const FUNDS: &str = "AvailableFunds";

    fn funds_request() -> Request {
        funds_request_on("2000")
    }

    fn funds_request_on(screen: &str) -> Request {
        Request::tr_query(FUNDS, "opw00001", screen)
    }

    fn funds_reply(available: i64) -> Reply {
        Reply::Tr(TrResult::OrderableFunds(OrderableFunds {
            deposit: 0,
            available_funds: available,
        }))
    }

    #[test]
    fn test_resolve_releases_and_take_returns_result() {
        let correlator = RequestCorrelator::new();
        let gate = correlator.begin_request(funds_request()).unwrap();

        assert_eq!(
            correlator.resolve(FUNDS, "2000", Some(funds_reply(1_250_000))),
            Resolution::Resolved
        );
        assert_eq!(gate.wait(Duration::from_millis(10)), GateStatus::Released);
        assert_eq!(correlator.take(FUNDS), Some(funds_reply(1_250_000)));
        assert_eq!(correlator.in_flight(), 0);
    }

    #[test]
    fn test_duplicate_key_rejected_until_taken() {
        let correlator = RequestCorrelator::new();
        correlator.begin_request(funds_request()).unwrap();

        let err = correlator
            .begin_request(funds_request_on("2001"))
            .unwrap_err();
        assert_eq!(err, CorrelationError::AlreadyInFlight(FUNDS.to_string()));

        correlator.resolve(FUNDS, "2000", Some(funds_reply(1)));
        assert!(correlator.begin_request(funds_request_on("2001")).is_err());

        correlator.take(FUNDS);
        assert!(correlator.begin_request(funds_request_on("2001")).is_ok());
    }

    #[test]
    fn test_unknown_and_repeated_resolve_are_noops() {
        let correlator = RequestCorrelator::new();
        assert_eq!(
            correlator.resolve("Nobody", "9999", Some(funds_reply(1))),
            Resolution::Unmatched
        );
        assert!(correlator.last_resolution().is_none());

        correlator.begin_request(funds_request()).unwrap();
        assert_eq!(
            correlator.resolve(FUNDS, "2000", Some(funds_reply(1))),
            Resolution::Resolved
        );
        assert_eq!(
            correlator.resolve(FUNDS, "2000", Some(funds_reply(2))),
            Resolution::Duplicate
        );
        assert_eq!(correlator.take(FUNDS), Some(funds_reply(1)));
    }

    #[test]
    fn test_wrong_screen_does_not_resolve() {
        let correlator = RequestCorrelator::new();
        let gate = correlator.begin_request(funds_request()).unwrap();

        assert!(!correlator.expects(FUNDS, "2007"));
        assert_eq!(
            correlator.resolve(FUNDS, "2007", Some(funds_reply(1))),
            Resolution::Unmatched
        );
        assert!(!gate.is_released());
        assert!(correlator.expects(FUNDS, "2000"));
    }

    #[test]
    fn test_release_without_result() {
        let correlator = RequestCorrelator::new();
        let gate = correlator.begin_request(funds_request()).unwrap();

        correlator.resolve(FUNDS, "2000", None);
        assert!(gate.is_released());
        assert_eq!(correlator.take(FUNDS), None);
    }

    #[test]
    fn test_dropped_guard_releases_gate() {
        let correlator = RequestCorrelator::new();
        let gate = correlator.begin_request(funds_request()).unwrap();

        {
            let _guard = correlator.guard(FUNDS, "2000");
        }

        assert!(gate.is_released());
        assert_eq!(correlator.take(FUNDS), None);
    }

    #[test]
    fn test_guard_released_during_panic() {
        let correlator = RequestCorrelator::new();
        let gate = correlator.begin_request(funds_request()).unwrap();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = correlator.guard(FUNDS, "2000");
            panic!("parser blew up");
        }));

        assert!(result.is_err());
        assert!(gate.is_released());
    }

    #[test]
    fn test_late_notification_for_abandoned_screen_is_dropped() {
        let correlator = RequestCorrelator::new();
        let first = funds_request_on("2000");
        let first_id = first.id;
        let gate = correlator.begin_request(first).unwrap();

        assert_eq!(gate.wait(Duration::from_millis(5)), GateStatus::TimedOut);
        assert!(correlator.abandon(FUNDS, first_id));
        assert_eq!(correlator.abandoned_count(), 1);

        // Name is free again, on a fresh screen
        let second_gate = correlator.begin_request(funds_request_on("2001")).unwrap();

        assert!(correlator.expects(FUNDS, "2000"));
        assert_eq!(
            correlator.resolve(FUNDS, "2000", Some(funds_reply(111))),
            Resolution::Late
        );
        assert!(!second_gate.is_released());
        let last = correlator.last_resolution().unwrap();
        assert!(last.late);
        assert_eq!(last.request_id, Some(first_id));
        assert_eq!(last.reply, Some(funds_reply(111)));

        // A second copy of the stale notification goes nowhere
        assert_eq!(
            correlator.resolve(FUNDS, "2000", Some(funds_reply(111))),
            Resolution::Unmatched
        );

        assert_eq!(
            correlator.resolve(FUNDS, "2001", Some(funds_reply(222))),
            Resolution::Resolved
        );
        assert_eq!(correlator.take(FUNDS), Some(funds_reply(222)));
        assert_eq!(correlator.abandoned_count(), 0);
    }

    #[test]
    fn test_reuse_after_silent_request_succeeds() {
        let correlator = RequestCorrelator::new();
        let silent = funds_request_on("2000");
        let silent_id = silent.id;
        correlator.begin_request(silent).unwrap();
        assert!(correlator.abandon(FUNDS, silent_id));

        // Every later request under the name gets its own reply
        for (screen, amount) in [("2001", 1), ("2002", 2), ("2003", 3)] {
            let gate = correlator.begin_request(funds_request_on(screen)).unwrap();
            assert_eq!(
                correlator.resolve(FUNDS, screen, Some(funds_reply(amount))),
                Resolution::Resolved
            );
            assert!(gate.is_released());
            assert_eq!(correlator.take(FUNDS), Some(funds_reply(amount)));
        }
        assert_eq!(correlator.abandoned_count(), 1);
    }

    #[test]
    fn test_reissued_screen_forgets_abandoned_request() {
        let correlator = RequestCorrelator::new();
        let silent = funds_request_on("2000");
        let silent_id = silent.id;
        correlator.begin_request(silent).unwrap();
        correlator.abandon(FUNDS, silent_id);

        correlator.begin_request(funds_request_on("2000")).unwrap();

        assert_eq!(correlator.abandoned_count(), 0);
        assert_eq!(
            correlator.resolve(FUNDS, "2000", Some(funds_reply(7))),
            Resolution::Resolved
        );
    }

    #[test]
    fn test_abandon_ignores_other_request_id() {
        let correlator = RequestCorrelator::new();
        correlator.begin_request(funds_request()).unwrap();
        let other = funds_request_on("2001");

        assert!(!correlator.abandon(FUNDS, other.id));
        assert_eq!(correlator.in_flight(), 1);
        assert_eq!(correlator.abandoned_count(), 0);
    }

    #[test]
    fn test_abandon_after_resolution_leaves_nothing_behind() {
        let correlator = RequestCorrelator::new();
        let request = funds_request();
        let id = request.id;
        correlator.begin_request(request).unwrap();
        correlator.resolve(FUNDS, "2000", Some(funds_reply(9)));

        assert!(!correlator.abandon(FUNDS, id));
        assert_eq!(correlator.abandoned_count(), 0);
        assert_eq!(correlator.in_flight(), 0);
        assert!(!correlator.expects(FUNDS, "2000"));
    }

    #[test]
    fn test_resolve_racing_abandon_settles_one_way() {
        for _ in 0..200 {
            let correlator = Arc::new(RequestCorrelator::new());
            let request = funds_request();
            let id = request.id;
            correlator.begin_request(request).unwrap();

            let remote = correlator.clone();
            let notifier = thread::spawn(move || remote.resolve(FUNDS, "2000", Some(funds_reply(5))));
            let abandoned = correlator.abandon(FUNDS, id);
            let resolution = notifier.join().unwrap();

            if abandoned {
                assert_eq!(resolution, Resolution::Late);
            } else {
                assert_eq!(resolution, Resolution::Resolved);
            }
            // Either way nothing is left to catch a later request's reply
            assert_eq!(correlator.abandoned_count(), 0);
            assert_eq!(correlator.in_flight(), 0);
        }
    }

    #[test]
    fn test_distinct_keys_resolve_independently() {
        let correlator = Arc::new(RequestCorrelator::new());
        let funds_gate = correlator.begin_request(funds_request()).unwrap();
        let order_gate = correlator
            .begin_request(Request::order(RequestKind::Order, "BuyOrder", "1000"))
            .unwrap();

        let remote = correlator.clone();
        thread::spawn(move || {
            let outcome = OrderOutcome {
                order_number: "0000001".to_string(),
                ..Default::default()
            };
            remote.resolve("BuyOrder", "1000", Some(Reply::Order(outcome)));
        })
        .join()
        .unwrap();

        assert_eq!(order_gate.wait(Duration::from_secs(1)), GateStatus::Released);
        assert!(!funds_gate.is_released());
        assert!(matches!(correlator.take("BuyOrder"), Some(Reply::Order(_))));
        assert_eq!(correlator.in_flight(), 1);
    }
}
