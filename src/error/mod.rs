//! Error types for segpool.

use std::io;

use thiserror::Error;

/// Errors returned when acquiring a segment from a [`SegmentPool`](crate::SegmentPool).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AcquireError {
    /// The [`CancelToken`](crate::CancelToken) attached to the acquisition was cancelled.
    #[error("segment acquisition cancelled")]
    Cancelled,

    /// The deadline attached to the acquisition passed before a permit was free.
    #[error("segment acquisition deadline exceeded")]
    DeadlineExceeded,
}

/// Errors that can occur while constructing or using a buffer.
#[derive(Debug, Error)]
pub enum BufferError {
    /// The write would push the buffer past the pool's nominal byte capacity.
    ///
    /// This is measured against the buffer's own accounting, not the pool's
    /// live usage.
    #[error("pool too small: {requested} bytes requested, pool holds {capacity} bytes")]
    PoolTooSmall {
        /// Accounted bytes the buffer would hold after the write.
        requested: usize,
        /// The pool's capacity in bytes.
        capacity: usize,
    },

    /// The write would push the buffer past its own configured capacity.
    #[error("buffer capacity too small: {requested} bytes requested, buffer holds {capacity} bytes")]
    BufferTooSmall {
        /// Accounted bytes the buffer would hold after the write.
        requested: usize,
        /// The buffer's capacity in bytes.
        capacity: usize,
    },

    /// A segment could not be acquired mid-write.
    ///
    /// Bytes copied before the failed acquisition stay in the buffer.
    #[error("write interrupted after {written} bytes: {source}")]
    Acquire {
        /// Bytes committed by the interrupted write.
        written: usize,
        /// Why the acquisition failed.
        #[source]
        source: AcquireError,
    },

    /// A read ran out of data before filling the destination.
    #[error("end of data after {read} bytes")]
    EndOfData {
        /// Bytes copied into the destination before the data ran out.
        read: usize,
    },

    /// Invalid configuration parameter.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },
}

impl BufferError {
    /// Returns how many bytes the failed call still transferred.
    ///
    /// Only [`BufferError::Acquire`] and [`BufferError::EndOfData`] can carry
    /// partial progress; everything else rejects the call up front.
    pub fn transferred(&self) -> usize {
        match self {
            BufferError::Acquire { written, .. } => *written,
            BufferError::EndOfData { read } => *read,
            _ => 0,
        }
    }
}

impl From<BufferError> for io::Error {
    fn from(e: BufferError) -> Self {
        let kind = match &e {
            BufferError::PoolTooSmall { .. } | BufferError::BufferTooSmall { .. } => {
                io::ErrorKind::OutOfMemory
            }
            BufferError::Acquire {
                source: AcquireError::Cancelled,
                ..
            } => io::ErrorKind::Other,
            BufferError::Acquire {
                source: AcquireError::DeadlineExceeded,
                ..
            } => io::ErrorKind::TimedOut,
            BufferError::EndOfData { .. } => io::ErrorKind::UnexpectedEof,
            BufferError::InvalidConfig { .. } => io::ErrorKind::InvalidInput,
        };
        io::Error::new(kind, e)
    }
}
