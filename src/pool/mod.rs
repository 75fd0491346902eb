//! Segment pooling.
//!
//! - [`Segment`] - Fixed-size block with a write mark and a read cursor
//! - [`SegmentPool`] - Bounded, recycling supply of segments
//! - [`PoolStats`] - Counters for observing a pool
//!
//! The bound is enforced by a counting permit gate: acquisition blocks
//! (or, with `async-io`, parks the task) until another holder returns a
//! segment.

mod gate;
mod segment;
mod segment_pool;

pub use segment::Segment;
pub use segment_pool::{PoolStats, SegmentPool};
