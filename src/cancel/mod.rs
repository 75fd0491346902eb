//! Cancellation and deadlines for segment acquisition.
//!
//! - [`AcquireContext`] - What may abort a blocking [`SegmentPool::get`](crate::SegmentPool::get)
//! - [`CancelToken`] - Shared flag that cancels every context holding it
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use segpool::{AcquireContext, CancelToken};
//!
//! let token = CancelToken::new();
//! let ctx = AcquireContext::background()
//!     .with_timeout(Duration::from_millis(50))
//!     .with_token(token.clone());
//!
//! token.cancel();
//! assert!(ctx.is_cancelled());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::error::AcquireError;

/// A cloneable cancellation flag.
///
/// All clones observe the same state. Once cancelled a token stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the token and every clone of it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Returns true once [`CancelToken::cancel`] has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Conditions under which a blocking acquisition gives up.
///
/// The default context, [`AcquireContext::background`], never gives up.
#[derive(Debug, Clone, Default)]
pub struct AcquireContext {
    token: Option<CancelToken>,
    deadline: Option<Instant>,
}

impl AcquireContext {
    /// A context that never cancels and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Gives up at `deadline`. An earlier deadline already set wins.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// Gives up `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    /// Gives up when `token` is cancelled.
    pub fn with_token(mut self, token: CancelToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Returns the deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the cancellation token, if any.
    pub fn token(&self) -> Option<&CancelToken> {
        self.token.as_ref()
    }

    /// Returns true if the attached token has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    /// Returns true if nothing can ever abort this context.
    pub(crate) fn is_background(&self) -> bool {
        self.token.is_none() && self.deadline.is_none()
    }

    /// Reports why this context is done at `now`, if it is.
    ///
    /// Cancellation takes precedence over an expired deadline.
    pub(crate) fn check(&self, now: Instant) -> Result<(), AcquireError> {
        if self.is_cancelled() {
            return Err(AcquireError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if now >= deadline => Err(AcquireError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}
