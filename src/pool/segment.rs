//! The Segment type - a fixed-size block handed out by a pool.

use std::fmt;

/// A fixed-capacity byte block with a write mark and a read cursor.
///
/// Bytes are appended at the write mark and consumed from the read cursor.
/// Both only move forward until the segment goes back to its pool, which
/// rewinds them to zero.
///
/// Segments are obtained from [`SegmentPool::get`](crate::SegmentPool::get)
/// and handed back with [`SegmentPool::put`](crate::SegmentPool::put).
///
/// # Example
///
/// ```
/// use segpool::{AcquireContext, SegmentPool};
///
/// let pool = SegmentPool::new(1, 8)?;
/// let mut segment = pool.get(&AcquireContext::background())?;
///
/// assert_eq!(segment.write(b"hello world"), 8);
/// let mut out = [0u8; 5];
/// assert_eq!(segment.read(&mut out), 5);
/// assert_eq!(segment.unread(), b" wo");
///
/// pool.put(segment);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Segment {
    data: Box<[u8]>,
    size: usize,
    offset: usize,
}

impl Segment {
    /// Allocates a zeroed segment of `len` bytes.
    pub(crate) fn new(len: usize) -> Self {
        Self {
            data: vec![0u8; len].into_boxed_slice(),
            size: 0,
            offset: 0,
        }
    }

    /// Returns the fixed length of the backing block.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Returns the number of bytes written (the write mark).
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns true if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the read cursor.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns how many more bytes can be written.
    pub fn room(&self) -> usize {
        self.data.len() - self.size
    }

    /// Returns true if the write mark reached the end of the block.
    pub fn is_full(&self) -> bool {
        self.size == self.data.len()
    }

    /// Returns true if every written byte has been read.
    pub fn is_drained(&self) -> bool {
        self.offset == self.size
    }

    /// Returns the bytes written but not yet read.
    pub fn unread(&self) -> &[u8] {
        &self.data[self.offset..self.size]
    }

    /// Appends as much of `src` as fits, returning the number of bytes copied.
    pub fn write(&mut self, src: &[u8]) -> usize {
        let n = src.len().min(self.room());
        self.data[self.size..self.size + n].copy_from_slice(&src[..n]);
        self.size += n;
        n
    }

    /// Consumes up to `dst.len()` unread bytes, returning the number copied.
    pub fn read(&mut self, dst: &mut [u8]) -> usize {
        let n = dst.len().min(self.size - self.offset);
        dst[..n].copy_from_slice(&self.data[self.offset..self.offset + n]);
        self.offset += n;
        n
    }

    /// Rewinds both marks. Contents are left in place.
    pub(crate) fn reset(&mut self) {
        self.size = 0;
        self.offset = 0;
    }
}

impl fmt::Debug for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Segment")
            .field("capacity", &self.data.len())
            .field("size", &self.size)
            .field("offset", &self.offset)
            .finish()
    }
}
