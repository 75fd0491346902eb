//! Pool facade - one shared segment pool, many buffers.
//!
//! - [`BufferPool`] - Builds the [`SegmentPool`] once and mints [`ChainBuffer`]s bound to it

use std::sync::Arc;

use tracing::warn;

use crate::buffer::ChainBuffer;
use crate::config::{PoolConfig, UNLIMITED};
use crate::error::BufferError;
use crate::pool::{PoolStats, SegmentPool};

/// Factory for [`ChainBuffer`]s sharing one memory budget.
///
/// Cloning a `BufferPool` is cheap and shares the underlying pool. The pool
/// lives as long as any clone or any buffer created from it.
///
/// # Example
///
/// ```
/// use segpool::BufferPool;
///
/// // 100 KiB carved into 4 KiB segments
/// let pool = BufferPool::new(100 * 1024, 4 * 1024)?;
/// assert_eq!(pool.segment_pool().capacity(), 25);
///
/// let buffer = pool.buffer(16 * 1024);
/// buffer.write(b"payload")?;
/// assert_eq!(&buffer.read_all()?[..], b"payload");
/// buffer.free();
/// # Ok::<(), segpool::BufferError>(())
/// ```
#[derive(Debug, Clone)]
pub struct BufferPool {
    pool: Arc<SegmentPool>,
}

impl BufferPool {
    /// Creates a pool allowing `max_memory` bytes out at once in
    /// `segment_size`-byte segments.
    ///
    /// `max_memory == 0` makes the pool unlimited. A budget smaller than one
    /// segment also ends up unlimited.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InvalidConfig`] if `segment_size` is zero.
    pub fn new(max_memory: usize, segment_size: usize) -> Result<Self, BufferError> {
        Self::from_config(PoolConfig::new(max_memory, segment_size)?)
    }

    /// Creates a pool from a [`PoolConfig`].
    pub fn from_config(config: PoolConfig) -> Result<Self, BufferError> {
        config.validate()?;
        if config.max_memory() != UNLIMITED && config.is_unlimited() {
            warn!(
                max_memory = config.max_memory(),
                segment_size = config.segment_size(),
                "memory budget below one segment, pool is unlimited"
            );
        }

        Ok(Self {
            pool: Arc::new(SegmentPool::from_config(&config)?),
        })
    }

    /// Creates an empty buffer holding at most `max_len` bytes.
    ///
    /// `max_len` is rounded up to whole segments; `0` means the buffer is
    /// limited only by the pool.
    pub fn buffer(&self, max_len: usize) -> ChainBuffer {
        ChainBuffer::new(Arc::clone(&self.pool), max_len)
    }

    /// Returns the shared segment pool.
    pub fn segment_pool(&self) -> &Arc<SegmentPool> {
        &self.pool
    }

    /// Returns a snapshot of the pool's counters.
    pub fn stats(&self) -> PoolStats {
        self.pool.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_from_budget() {
        let pool = BufferPool::new(16, 4).unwrap();
        assert_eq!(pool.segment_pool().capacity(), 4);
        assert_eq!(pool.segment_pool().capacity_in_bytes(), 16);
    }

    #[test]
    fn test_zero_budget_is_unlimited() {
        let pool = BufferPool::new(0, 4).unwrap();
        assert!(pool.segment_pool().is_unlimited());

        let pool = BufferPool::new(3, 4).unwrap();
        assert!(pool.segment_pool().is_unlimited());
    }

    #[test]
    fn test_zero_segment_size_fails() {
        assert!(matches!(
            BufferPool::new(16, 0),
            Err(BufferError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_buffers_share_pool() {
        let pool = BufferPool::new(16, 4).unwrap();
        let a = pool.buffer(0);
        let b = pool.clone().buffer(8);

        a.write(b"abcdef").unwrap();
        b.write(b"gh").unwrap();
        assert_eq!(pool.stats().outstanding, 3);
        assert!(Arc::ptr_eq(a.pool(), b.pool()));
        assert_eq!(b.capacity(), 2);
    }
}
