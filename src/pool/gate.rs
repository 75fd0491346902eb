//! Counting permit gate that bounds outstanding segments.

use std::time::{Duration, Instant};

#[cfg(feature = "async-io")]
use std::task::{Context, Poll};
use std::task::Waker;

use parking_lot::{Condvar, Mutex};

use crate::cancel::AcquireContext;
use crate::error::AcquireError;

/// Longest a waiter with a [`CancelToken`](crate::CancelToken) sleeps before
/// looking at the token again.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(5);

struct GateState {
    available: usize,
    wakers: Vec<Waker>,
}

/// A counting semaphore with blocking, cancellable and polled acquisition.
///
/// The gate is not FIFO-fair. `try_acquire` and `poll_acquire` may take a
/// released permit ahead of a parked blocking waiter, and `release` wakes
/// every registered task so they race for the permit.
pub(crate) struct Permits {
    state: Mutex<GateState>,
    released: Condvar,
}

impl Permits {
    pub(crate) fn new(permits: usize) -> Self {
        Self {
            state: Mutex::new(GateState {
                available: permits,
                wakers: Vec::new(),
            }),
            released: Condvar::new(),
        }
    }

    /// Takes a permit if one is free right now.
    pub(crate) fn try_acquire(&self) -> bool {
        let mut state = self.state.lock();
        if state.available > 0 {
            state.available -= 1;
            true
        } else {
            false
        }
    }

    /// Takes a permit, blocking until one is released or `ctx` is done.
    ///
    /// A context that is already done fails even if a permit is free.
    pub(crate) fn acquire(&self, ctx: &AcquireContext) -> Result<(), AcquireError> {
        let mut state = self.state.lock();
        loop {
            if let Err(e) = ctx.check(Instant::now()) {
                // We may have consumed a notification meant for another waiter.
                if state.available > 0 {
                    self.released.notify_one();
                }
                return Err(e);
            }

            if state.available > 0 {
                state.available -= 1;
                return Ok(());
            }

            if ctx.is_background() {
                self.released.wait(&mut state);
                continue;
            }

            let mut wake_at = ctx.deadline();
            if ctx.token().is_some() {
                let poll_at = Instant::now() + CANCEL_POLL_INTERVAL;
                wake_at = Some(wake_at.map_or(poll_at, |d| d.min(poll_at)));
            }
            if let Some(wake_at) = wake_at {
                let _ = self.released.wait_until(&mut state, wake_at);
            }
        }
    }

    /// Takes a permit or registers the task to be woken on the next release.
    #[cfg(feature = "async-io")]
    pub(crate) fn poll_acquire(&self, cx: &mut Context<'_>) -> Poll<()> {
        let mut state = self.state.lock();
        if state.available > 0 {
            state.available -= 1;
            return Poll::Ready(());
        }
        if !state.wakers.iter().any(|w| w.will_wake(cx.waker())) {
            state.wakers.push(cx.waker().clone());
        }
        Poll::Pending
    }

    /// Returns one permit. Never blocks on a waiter.
    pub(crate) fn release(&self) {
        let wakers = {
            let mut state = self.state.lock();
            state.available += 1;
            std::mem::take(&mut state.wakers)
        };
        self.released.notify_one();
        for waker in wakers {
            waker.wake();
        }
    }

    /// Returns the number of free permits.
    pub(crate) fn available(&self) -> usize {
        self.state.lock().available
    }
}
