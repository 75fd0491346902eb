//! Chained buffer - pooled segments presented as one byte stream.
//!
//! A [`ChainBuffer`] keeps an ordered queue of [`Segment`]s. Writes append to
//! the tail segment and pull fresh segments from the shared
//! [`SegmentPool`] as the tail fills up; reads consume from the front and
//! hand every fully drained segment straight back to the pool.
//!
//! # Accounting
//!
//! The buffer tracks an accounted size: every written byte adds one, and a
//! segment's full length is subtracted only when that segment is evicted.
//! Bytes already read from the front segment therefore stay charged until
//! the whole segment drains. Capacity checks use this value; the unread
//! length is the accounted size minus the front segment's read cursor.
//!
//! # Example
//!
//! ```
//! use segpool::BufferPool;
//!
//! let pool = BufferPool::new(16, 4)?;
//! let buffer = pool.buffer(0);
//!
//! buffer.write(b"ABCDEFGHIJ")?;
//! assert_eq!(&buffer.read_all()?[..], b"ABCDEFGHIJ");
//!
//! // Drained segments went back to the pool, so there is room again.
//! buffer.write(b"KLMNOPQ")?;
//! assert_eq!(buffer.len(), 7);
//! # Ok::<(), segpool::BufferError>(())
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

#[cfg(feature = "async-io")]
use std::task::{Context, Poll};

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::cancel::AcquireContext;
use crate::config::UNLIMITED;
use crate::error::BufferError;
use crate::pool::{Segment, SegmentPool};

/// Segments held by one buffer plus its accounted size.
#[derive(Debug, Default)]
struct Chain {
    segments: VecDeque<Segment>,
    size: usize,
}

impl Chain {
    /// Bytes written but not yet read.
    fn unread(&self) -> usize {
        match self.segments.front() {
            Some(front) => self.size - front.offset(),
            None => self.size,
        }
    }

    /// True if the next byte needs a fresh segment.
    fn needs_segment(&self) -> bool {
        self.segments.back().is_none_or(Segment::is_full)
    }

    /// Copies as much of `data` as fits into the tail segment.
    fn append(&mut self, data: &[u8]) -> usize {
        let copied = match self.segments.back_mut() {
            Some(tail) => tail.write(data),
            None => 0,
        };
        self.size += copied;
        copied
    }

    /// Drains from the front into `dst`, returning emptied segments to `pool`.
    fn read_into(&mut self, pool: &SegmentPool, dst: &mut [u8]) -> Result<usize, BufferError> {
        let mut read = 0;
        while read < dst.len() {
            let Some(front) = self.segments.front_mut() else {
                break;
            };
            read += front.read(&mut dst[read..]);

            if front.is_drained() {
                if let Some(segment) = self.segments.pop_front() {
                    self.size -= segment.len();
                    pool.put(segment);
                }
            }
        }

        if read < dst.len() {
            return Err(BufferError::EndOfData { read });
        }
        Ok(read)
    }

    /// Returns every segment to `pool` and zeroes the accounting.
    fn release_all(&mut self, pool: &SegmentPool) -> usize {
        let released = self.segments.len();
        for segment in self.segments.drain(..) {
            pool.put(segment);
        }
        self.size = 0;
        released
    }
}

/// A growable byte stream backed by segments from a shared [`SegmentPool`].
///
/// All operations take `&self` and are serialized by one lock per buffer,
/// so a buffer can be shared between threads. Different buffers on the
/// same pool only meet at the pool.
///
/// Call [`free`](ChainBuffer::free) when done to hand segments back
/// promptly. Dropping the buffer performs the same release as a backstop.
pub struct ChainBuffer {
    pool: Arc<SegmentPool>,
    capacity: usize,
    chain: Mutex<Chain>,
}

impl ChainBuffer {
    /// Creates an empty buffer drawing from `pool`.
    ///
    /// `max_len` is the most bytes the buffer may hold, rounded up to whole
    /// segments; `0` means no per-buffer limit (the pool's bound still applies).
    pub fn new(pool: Arc<SegmentPool>, max_len: usize) -> Self {
        let capacity = max_len.div_ceil(pool.segment_size());
        Self {
            pool,
            capacity,
            chain: Mutex::new(Chain::default()),
        }
    }

    /// Appends `data`, blocking on the pool for as long as it takes.
    ///
    /// Equivalent to [`write_with`](ChainBuffer::write_with) using
    /// [`AcquireContext::background`].
    pub fn write(&self, data: &[u8]) -> Result<usize, BufferError> {
        self.write_with(&AcquireContext::background(), data)
    }

    /// Appends `data`, giving up on the pool when `ctx` is done.
    ///
    /// # Errors
    ///
    /// - [`BufferError::PoolTooSmall`] if the accounted size plus `data`
    ///   exceeds the pool's nominal byte capacity
    /// - [`BufferError::BufferTooSmall`] if it exceeds this buffer's capacity
    /// - [`BufferError::Acquire`] if a segment could not be acquired; the
    ///   bytes copied before that stay in the buffer and are reported in
    ///   `written`
    pub fn write_with(&self, ctx: &AcquireContext, data: &[u8]) -> Result<usize, BufferError> {
        let mut chain = self.chain.lock();
        self.check_capacity(&chain, data.len())?;

        let mut written = 0;
        while written < data.len() {
            if chain.needs_segment() {
                match self.pool.get(ctx) {
                    Ok(segment) => chain.segments.push_back(segment),
                    Err(source) => {
                        debug!(written, %source, "write interrupted");
                        return Err(BufferError::Acquire { written, source });
                    }
                }
            }
            written += chain.append(&data[written..]);
        }
        Ok(written)
    }

    /// Non-blocking counterpart of `write_with` used by the async adapter.
    ///
    /// Pending only when nothing could be written yet; otherwise reports the
    /// partial count.
    #[cfg(feature = "async-io")]
    pub(crate) fn poll_write_segments(
        &self,
        cx: &mut Context<'_>,
        data: &[u8],
    ) -> Poll<Result<usize, BufferError>> {
        let mut chain = self.chain.lock();
        self.check_capacity(&chain, data.len())?;

        let mut written = 0;
        while written < data.len() {
            if chain.needs_segment() {
                match self.pool.poll_get(cx) {
                    Poll::Ready(segment) => chain.segments.push_back(segment),
                    Poll::Pending if written == 0 => return Poll::Pending,
                    Poll::Pending => break,
                }
            }
            written += chain.append(&data[written..]);
        }
        Poll::Ready(Ok(written))
    }

    fn check_capacity(&self, chain: &Chain, len: usize) -> Result<(), BufferError> {
        let requested = chain.size.saturating_add(len);

        if !self.pool.is_unlimited() && requested > self.pool.capacity_in_bytes() {
            debug!(requested, capacity = self.pool.capacity_in_bytes(), "pool too small");
            return Err(BufferError::PoolTooSmall {
                requested,
                capacity: self.pool.capacity_in_bytes(),
            });
        }

        if !self.is_unlimited() && requested > self.capacity_in_bytes() {
            debug!(requested, capacity = self.capacity_in_bytes(), "buffer capacity too small");
            return Err(BufferError::BufferTooSmall {
                requested,
                capacity: self.capacity_in_bytes(),
            });
        }

        Ok(())
    }

    /// Fills `dst` from the front of the stream.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::EndOfData`] if the data ran out before `dst`
    /// was full. The bytes that were copied are consumed and counted in `read`.
    pub fn read(&self, dst: &mut [u8]) -> Result<usize, BufferError> {
        self.chain.lock().read_into(&self.pool, dst)
    }

    /// Drains every unread byte into a new [`Bytes`].
    pub fn read_all(&self) -> Result<Bytes, BufferError> {
        let mut chain = self.chain.lock();
        let mut out = vec![0u8; chain.unread()];
        chain.read_into(&self.pool, &mut out)?;
        Ok(Bytes::from(out))
    }

    /// Returns all segments to the pool and empties the buffer.
    ///
    /// Calling it on an empty buffer does nothing.
    pub fn free(&self) {
        let released = self.chain.lock().release_all(&self.pool);
        if released > 0 {
            debug!(released, "freed buffer segments");
        }
    }

    /// Returns the number of unread bytes.
    pub fn len(&self) -> usize {
        self.chain.lock().unread()
    }

    /// Returns true if there is nothing to read.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the accounted size used for capacity checks.
    ///
    /// This includes bytes already read from the front segment.
    pub fn accounted_size(&self) -> usize {
        self.chain.lock().size
    }

    /// Returns the number of segments currently held.
    pub fn segment_count(&self) -> usize {
        self.chain.lock().segments.len()
    }

    /// Returns the maximum number of segments this buffer may hold, 0 for unlimited.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the maximum number of bytes this buffer may hold, 0 for unlimited.
    pub fn capacity_in_bytes(&self) -> usize {
        self.capacity.saturating_mul(self.pool.segment_size())
    }

    /// Returns true if this buffer has no limit of its own.
    pub fn is_unlimited(&self) -> bool {
        self.capacity == UNLIMITED
    }

    /// Returns the pool this buffer draws from.
    pub fn pool(&self) -> &Arc<SegmentPool> {
        &self.pool
    }
}

impl Drop for ChainBuffer {
    fn drop(&mut self) {
        let released = self.chain.get_mut().release_all(&self.pool);
        if released > 0 {
            trace!(released, "reclaimed segments from dropped buffer");
        }
    }
}

impl std::fmt::Debug for ChainBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let chain = self.chain.lock();
        f.debug_struct("ChainBuffer")
            .field("capacity", &self.capacity)
            .field("segments", &chain.segments.len())
            .field("size", &chain.size)
            .field("unread", &chain.unread())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn pool(capacity: usize, segment_size: usize) -> Arc<SegmentPool> {
        Arc::new(SegmentPool::new(capacity, segment_size).unwrap())
    }

    #[test]
    fn test_capacity_rounds_up() {
        let buffer = ChainBuffer::new(pool(0, 4), 9);
        assert_eq!(buffer.capacity(), 3);
        assert_eq!(buffer.capacity_in_bytes(), 12);

        let buffer = ChainBuffer::new(pool(0, 4), 0);
        assert!(buffer.is_unlimited());
    }

    #[test]
    fn test_write_spans_segments() {
        let buffer = ChainBuffer::new(pool(4, 4), 0);
        assert_eq!(buffer.write(b"ABCDEFGHIJ").unwrap(), 10);
        assert_eq!(buffer.segment_count(), 3);
        assert_eq!(buffer.accounted_size(), 10);
        assert_eq!(buffer.pool().stats().outstanding, 3);
    }

    #[test]
    fn test_empty_write_takes_no_segment() {
        let buffer = ChainBuffer::new(pool(1, 4), 0);
        assert_eq!(buffer.write(b"").unwrap(), 0);
        assert_eq!(buffer.segment_count(), 0);
    }

    #[test]
    fn test_accounting_keeps_partially_read_front() {
        let buffer = ChainBuffer::new(pool(0, 4), 0);
        buffer.write(b"ABCDEF").unwrap();

        let mut out = [0u8; 2];
        buffer.read(&mut out).unwrap();
        assert_eq!(&out, b"AB");
        assert_eq!(buffer.accounted_size(), 6);
        assert_eq!(buffer.len(), 4);

        let mut out = [0u8; 2];
        buffer.read(&mut out).unwrap();
        // Front segment drained and evicted with its full length.
        assert_eq!(buffer.accounted_size(), 2);
        assert_eq!(buffer.segment_count(), 1);
    }

    #[test]
    fn test_short_read_reports_end_of_data() {
        let buffer = ChainBuffer::new(pool(0, 4), 0);
        buffer.write(b"xyz").unwrap();

        let mut out = [0u8; 8];
        match buffer.read(&mut out) {
            Err(BufferError::EndOfData { read }) => assert_eq!(read, 3),
            other => panic!("expected end of data, got {:?}", other),
        }
        assert_eq!(&out[..3], b"xyz");
        assert_eq!(buffer.segment_count(), 0);
    }

    #[test]
    fn test_zero_length_read_at_end() {
        let buffer = ChainBuffer::new(pool(0, 4), 0);
        assert_eq!(buffer.read(&mut []).unwrap(), 0);
    }

    #[test]
    fn test_exact_read_without_exhausting() {
        let buffer = ChainBuffer::new(pool(0, 4), 0);
        buffer.write(b"abcdefgh").unwrap();

        let mut out = [0u8; 4];
        assert_eq!(buffer.read(&mut out).unwrap(), 4);
        assert_eq!(buffer.len(), 4);
    }

    #[test]
    fn test_read_all_after_partial_read() {
        let buffer = ChainBuffer::new(pool(0, 4), 0);
        buffer.write(b"0123456789").unwrap();
        let mut out = [0u8; 3];
        buffer.read(&mut out).unwrap();

        let rest = buffer.read_all().unwrap();
        assert_eq!(&rest[..], b"3456789");
        assert!(buffer.is_empty());
        assert_eq!(buffer.accounted_size(), 0);
    }

    #[test]
    fn test_read_all_empty() {
        let buffer = ChainBuffer::new(pool(0, 4), 0);
        assert!(buffer.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_buffer_capacity_rejects_whole_write() {
        let buffer = ChainBuffer::new(pool(0, 4), 8);
        buffer.write(b"abcde").unwrap();

        let err = buffer.write(b"fghi").unwrap_err();
        assert!(matches!(
            err,
            BufferError::BufferTooSmall {
                requested: 9,
                capacity: 8
            }
        ));
        assert_eq!(buffer.len(), 5);
    }

    #[test]
    fn test_pool_capacity_checked_before_buffer_capacity() {
        let buffer = ChainBuffer::new(pool(2, 4), 4);
        let err = buffer.write(b"123456789").unwrap_err();
        assert!(matches!(err, BufferError::PoolTooSmall { capacity: 8, .. }));
        assert_eq!(buffer.segment_count(), 0);
    }

    #[test]
    fn test_interrupted_write_keeps_prefix() {
        let pool = pool(2, 4);
        let hog = ChainBuffer::new(Arc::clone(&pool), 0);
        hog.write(b"abcd").unwrap();

        let buffer = ChainBuffer::new(Arc::clone(&pool), 0);
        let ctx = AcquireContext::background().with_timeout(Duration::from_millis(10));
        let err = buffer.write_with(&ctx, b"ABCDEF").unwrap_err();
        assert_eq!(err.transferred(), 4);
        assert_eq!(buffer.len(), 4);

        hog.free();
        // `ctx` has expired; a done context fails even with a free permit.
        assert!(buffer.write_with(&ctx, b"EF").is_err());
        assert_eq!(buffer.write(b"EF").unwrap(), 2);
        assert_eq!(&buffer.read_all().unwrap()[..], b"ABCDEF");
    }

    #[test]
    fn test_free_is_idempotent() {
        let buffer = ChainBuffer::new(pool(4, 4), 0);
        buffer.write(b"hello world").unwrap();

        buffer.free();
        assert_eq!(buffer.pool().stats().outstanding, 0);
        assert_eq!(buffer.accounted_size(), 0);

        buffer.free();
        let stats = buffer.pool().stats();
        assert_eq!(stats.outstanding, 0);
        assert_eq!(stats.cached, 3);
        assert_eq!(buffer.pool().available(), Some(4));
    }

    #[test]
    fn test_drop_returns_segments() {
        let pool = pool(4, 4);
        {
            let buffer = ChainBuffer::new(Arc::clone(&pool), 0);
            buffer.write(b"0123456789").unwrap();
            assert_eq!(pool.stats().outstanding, 3);
        }
        assert_eq!(pool.stats().outstanding, 0);
        assert_eq!(pool.available(), Some(4));
    }
}
