//! Capacity-bounded supply of recycled segments.

use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "async-io")]
use std::task::{Context, Poll};

use crossbeam_queue::SegQueue;
use tracing::{debug, trace, warn};

use super::Segment;
use super::gate::Permits;
use crate::cancel::AcquireContext;
use crate::config::{PoolConfig, UNLIMITED};
use crate::error::{AcquireError, BufferError};

/// Point-in-time counters of a [`SegmentPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Segments currently checked out.
    pub outstanding: usize,
    /// Highest value `outstanding` has reached.
    pub peak_outstanding: usize,
    /// Segments ever allocated, as opposed to recycled.
    pub allocated: usize,
    /// Segments waiting in the recycle cache.
    pub cached: usize,
}

/// A pool of fixed-size [`Segment`]s with a bound on how many are checked out.
///
/// When the pool is bounded, every [`get`](SegmentPool::get) takes a permit
/// and every [`put`](SegmentPool::put) gives one back; `get` blocks while no
/// permit is free. Returned segments are cached for reuse. The cache itself
/// has no limit; the permits bound it indirectly.
///
/// `SegmentPool` is `Send + Sync` and is normally shared behind an `Arc`.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use segpool::{AcquireContext, AcquireError, SegmentPool};
///
/// let pool = SegmentPool::new(1, 4096)?;
/// let held = pool.get(&AcquireContext::background())?;
///
/// // The only permit is taken, so a bounded wait times out.
/// let ctx = AcquireContext::background().with_timeout(Duration::from_millis(10));
/// assert_eq!(pool.get(&ctx).unwrap_err(), AcquireError::DeadlineExceeded);
///
/// pool.put(held);
/// assert!(pool.try_get().is_some());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct SegmentPool {
    permits: Option<Permits>,
    cache: SegQueue<Segment>,
    capacity: usize,
    segment_size: usize,
    outstanding: AtomicUsize,
    peak: AtomicUsize,
    allocated: AtomicUsize,
}

impl SegmentPool {
    /// Creates a pool of `capacity` segments of `segment_size` bytes each.
    ///
    /// A `capacity` of `0` means unlimited. Nothing is allocated up front.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InvalidConfig`] if `segment_size` is zero.
    pub fn new(capacity: usize, segment_size: usize) -> Result<Self, BufferError> {
        if segment_size == 0 {
            return Err(BufferError::InvalidConfig {
                message: "segment size must be greater than 0",
            });
        }

        debug!(capacity, segment_size, "creating segment pool");

        Ok(Self {
            permits: (capacity != UNLIMITED).then(|| Permits::new(capacity)),
            cache: SegQueue::new(),
            capacity,
            segment_size,
            outstanding: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            allocated: AtomicUsize::new(0),
        })
    }

    /// Creates a pool sized by a [`PoolConfig`].
    pub fn from_config(config: &PoolConfig) -> Result<Self, BufferError> {
        config.validate()?;
        Self::new(config.capacity(), config.segment_size())
    }

    /// Checks out a segment, blocking while the pool is at capacity.
    ///
    /// The wait ends early with an error if `ctx` is cancelled or its
    /// deadline passes; in that case nothing is acquired. An unlimited pool
    /// never blocks and ignores `ctx`.
    pub fn get(&self, ctx: &AcquireContext) -> Result<Segment, AcquireError> {
        if let Some(permits) = &self.permits {
            permits.acquire(ctx)?;
        }
        Ok(self.checkout())
    }

    /// Checks out a segment only if one is available without waiting.
    pub fn try_get(&self) -> Option<Segment> {
        if let Some(permits) = &self.permits {
            if !permits.try_acquire() {
                return None;
            }
        }
        Some(self.checkout())
    }

    /// Checks out a segment, or registers `cx`'s waker for the next `put`.
    #[cfg(feature = "async-io")]
    pub fn poll_get(&self, cx: &mut Context<'_>) -> Poll<Segment> {
        if let Some(permits) = &self.permits {
            if permits.poll_acquire(cx).is_pending() {
                return Poll::Pending;
            }
        }
        Poll::Ready(self.checkout())
    }

    fn checkout(&self) -> Segment {
        let segment = self.cache.pop().unwrap_or_else(|| {
            let allocated = self.allocated.fetch_add(1, Ordering::Relaxed) + 1;
            trace!(allocated, segment_size = self.segment_size, "allocating segment");
            Segment::new(self.segment_size)
        });
        let outstanding = self.outstanding.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak.fetch_max(outstanding, Ordering::AcqRel);
        segment
    }

    /// Returns a segment to the pool.
    ///
    /// The caller must only return segments obtained from this pool: a permit
    /// is released for every call. A segment whose length does not match this
    /// pool's segment size is dropped instead of cached.
    pub fn put(&self, mut segment: Segment) {
        if segment.capacity() != self.segment_size {
            warn!(
                expected = self.segment_size,
                actual = segment.capacity(),
                "discarding foreign segment"
            );
        } else {
            segment.reset();
            // Saturates: a same-sized segment from another pool was never counted here.
            self.outstanding
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                    Some(n.saturating_sub(1))
                })
                .ok();
            self.cache.push(segment);
        }

        // Permit goes last: `outstanding` must never exceed the capacity.
        if let Some(permits) = &self.permits {
            permits.release();
        }
    }

    /// Returns the maximum number of segments checked out at once, 0 for unlimited.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the length of every segment this pool produces.
    pub fn segment_size(&self) -> usize {
        self.segment_size
    }

    /// Returns true if the pool has no bound.
    pub fn is_unlimited(&self) -> bool {
        self.capacity == UNLIMITED
    }

    /// Returns the nominal capacity in bytes, 0 for unlimited.
    pub fn capacity_in_bytes(&self) -> usize {
        self.capacity.saturating_mul(self.segment_size)
    }

    /// Returns the number of permits free right now, `None` for an unlimited pool.
    pub fn available(&self) -> Option<usize> {
        self.permits.as_ref().map(Permits::available)
    }

    /// Returns a snapshot of the pool's counters.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            outstanding: self.outstanding.load(Ordering::Acquire),
            peak_outstanding: self.peak.load(Ordering::Acquire),
            allocated: self.allocated.load(Ordering::Relaxed),
            cached: self.cache.len(),
        }
    }
}

impl std::fmt::Debug for SegmentPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentPool")
            .field("capacity", &self.capacity)
            .field("segment_size", &self.segment_size)
            .field("stats", &self.stats())
            .finish()
    }
}
