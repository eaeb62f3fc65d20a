//! Single-use suspension point for one in-flight request
//!
//! The calling thread waits on the gate after issuing a request; the
//! notification context releases it once. The released flag lives under the
//! same mutex the condvar waits on, so a release that happens before the
//! caller starts waiting is still observed.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Outcome of [`Gate::wait`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStatus {
    Released,
    TimedOut,
}

struct GateInner {
    released: Mutex<bool>,
    cond: Condvar,
}

/// Cloneable handle to a single-use gate
#[derive(Clone)]
pub struct Gate {
    inner: Arc<GateInner>,
}

impl Gate {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(GateInner {
                released: Mutex::new(false),
                cond: Condvar::new(),
            }),
        }
    }

    /// Release the gate, waking every waiter
    ///
    /// Returns `true` only for the call that performed the release; later calls
    /// are no-ops.
    pub fn release(&self) -> bool {
        let mut released = self.inner.released.lock();
        if *released {
            return false;
        }
        *released = true;
        self.inner.cond.notify_all();
        true
    }

    pub fn is_released(&self) -> bool {
        *self.inner.released.lock()
    }

    /// Block until released or until `timeout` elapses
    ///
    /// A timeout too large to form a deadline waits without one.
    pub fn wait(&self, timeout: Duration) -> GateStatus {
        let deadline = Instant::now().checked_add(timeout);
        let mut released = self.inner.released.lock();

        // Loop absorbs spurious wakeups
        while !*released {
            let Some(deadline) = deadline else {
                self.inner.cond.wait(&mut released);
                continue;
            };
            if self.inner.cond.wait_until(&mut released, deadline).timed_out() {
                return if *released {
                    GateStatus::Released
                } else {
                    GateStatus::TimedOut
                };
            }
        }

        GateStatus::Released
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gate")
            .field("released", &self.is_released())
            .finish()
    }
}
