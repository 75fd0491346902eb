//! Configuration for segment pools.
//!
//! - [`PoolConfig`] - Memory budget and segment size of a [`BufferPool`](crate::BufferPool)
//!
//! # Example
//!
//! ```
//! use segpool::PoolConfig;
//!
//! // 1 MiB budget carved into 4 KiB segments
//! let config = PoolConfig::new(1024 * 1024, 4096)?;
//! assert_eq!(config.capacity(), 256);
//!
//! // Builder pattern
//! let config = PoolConfig::default()
//!     .with_max_memory(64 * 1024)
//!     .with_segment_size(1024);
//! assert_eq!(config.capacity(), 64);
//!
//! # Ok::<(), segpool::BufferError>(())
//! ```

use crate::error::BufferError;

/// Default segment size (4 KiB).
pub const DEFAULT_SEGMENT_SIZE: usize = 4 * 1024;

/// Memory budget value meaning "no bound".
pub const UNLIMITED: usize = 0;

/// Configuration for a segment pool.
///
/// `PoolConfig` controls how much memory a pool may hand out and how that
/// memory is carved into segments:
///
/// - Maximum memory (`max_memory`) - Total bytes the pool may have checked out
///   at once, or [`UNLIMITED`]
/// - Segment size (`segment_size`) - Length of every segment the pool produces
///
/// The pool's capacity in segments is `max_memory / segment_size`, rounded
/// down. A budget smaller than one segment rounds down to zero, which means
/// unlimited.
///
/// # Example
///
/// ```
/// use segpool::PoolConfig;
///
/// let config = PoolConfig::default();
/// assert!(config.is_unlimited());
/// assert_eq!(config.segment_size(), segpool::DEFAULT_SEGMENT_SIZE);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolConfig {
    /// Total bytes the pool may have outstanding, 0 for unlimited.
    max_memory: usize,

    /// Length of every segment in bytes.
    segment_size: usize,
}

impl PoolConfig {
    /// Creates a new configuration.
    ///
    /// # Arguments
    ///
    /// * `max_memory` - Memory budget in bytes, or `0` for unlimited
    /// * `segment_size` - Segment length in bytes (must be non-zero)
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InvalidConfig`] if `segment_size` is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use segpool::PoolConfig;
    ///
    /// assert!(PoolConfig::new(16, 4).is_ok());
    /// assert!(PoolConfig::new(16, 0).is_err());
    /// ```
    pub fn new(max_memory: usize, segment_size: usize) -> Result<Self, BufferError> {
        if segment_size == 0 {
            return Err(BufferError::InvalidConfig {
                message: "segment size must be greater than 0",
            });
        }

        Ok(Self {
            max_memory,
            segment_size,
        })
    }

    /// Sets the memory budget.
    ///
    /// Note: This does not validate the configuration. Use [`PoolConfig::validate`]
    /// to check if the configuration is valid.
    pub fn with_max_memory(mut self, max_memory: usize) -> Self {
        self.max_memory = max_memory;
        self
    }

    /// Sets the segment size.
    ///
    /// Note: This does not validate the configuration. Use [`PoolConfig::validate`]
    /// to check if the configuration is valid.
    pub fn with_segment_size(mut self, segment_size: usize) -> Self {
        self.segment_size = segment_size;
        self
    }

    /// Returns the memory budget in bytes.
    pub fn max_memory(&self) -> usize {
        self.max_memory
    }

    /// Returns the segment size in bytes.
    pub fn segment_size(&self) -> usize {
        self.segment_size
    }

    /// Returns the number of segments the pool may have checked out at once.
    ///
    /// `0` means unlimited.
    pub fn capacity(&self) -> usize {
        if self.segment_size == 0 {
            return UNLIMITED;
        }
        self.max_memory / self.segment_size
    }

    /// Returns true if the pool built from this configuration is unbounded.
    pub fn is_unlimited(&self) -> bool {
        self.capacity() == UNLIMITED
    }

    /// Validates the current configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use segpool::PoolConfig;
    ///
    /// let config = PoolConfig::default().with_segment_size(0);
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), BufferError> {
        Self::new(self.max_memory, self.segment_size).map(|_| ())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_memory: UNLIMITED,
            segment_size: DEFAULT_SEGMENT_SIZE,
        }
    }
}
