//! segpool
//!
//! Bounded segment pool and chained byte buffers for Rust.
//!
//! `segpool` keeps memory for byte streams in fixed-size segments that are
//! recycled through a shared, capacity-bounded pool. It is designed as a
//! small primitive for hot paths that would otherwise churn large
//! allocations:
//!
//! - serialization targets
//! - network read/write staging
//! - bounded in-memory spooling
//!
//! The crate intentionally:
//! - does NOT seek or provide random access
//! - does NOT compact or defragment segments
//! - does NOT share memory across processes
//!
//! It only does one thing: **Write bytes → read them back, within a budget**
//!
//! When the pool's budget is used up, writers block until another buffer
//! hands segments back (or until their [`AcquireContext`] gives up).
//!
//! # Sync
//!
//! ```
//! use std::io::Write;
//! use segpool::BufferPool;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1 MiB budget in 4 KiB segments
//!     let pool = BufferPool::new(1024 * 1024, 4096)?;
//!     let mut buffer = pool.buffer(64 * 1024);
//!
//!     write!(buffer, "hello {}", "world")?;
//!     let data = buffer.read_all()?;
//!     assert_eq!(&data[..], b"hello world");
//!
//!     buffer.free();
//!     Ok(())
//! }
//! ```
//!
//! # Async (feature = "async-io")
//!
//! ```ignore
//! use futures_util::io::{AsyncReadExt, AsyncWriteExt};
//! use segpool::BufferPool;
//!
//! async fn demo() -> std::io::Result<()> {
//!     let pool = BufferPool::new(1024 * 1024, 4096)?;
//!     let mut buffer = pool.buffer(0);
//!
//!     buffer.write_all(b"hello").await?;
//!     let mut out = Vec::new();
//!     buffer.read_to_end(&mut out).await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod buffer;
mod cancel;
mod config;
mod error;
mod factory;
mod pool;

#[cfg(feature = "async-io")]
mod async_io;

//
// Public surface (intentionally tiny)
//

pub use buffer::ChainBuffer;
pub use cancel::{AcquireContext, CancelToken};
pub use config::{DEFAULT_SEGMENT_SIZE, PoolConfig, UNLIMITED};
pub use error::{AcquireError, BufferError};
pub use factory::BufferPool;
pub use pool::{PoolStats, Segment, SegmentPool};
