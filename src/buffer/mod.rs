//! Chained segment buffers.
//!
//! - [`ChainBuffer`] - Byte stream assembled from pooled segments
//!
//! [`ChainBuffer`] implements [`std::io::Read`] and [`std::io::Write`]
//! (for both owned values and shared references), and the `futures-io`
//! traits with the `async-io` feature.

mod chain;
mod io;

pub use chain::ChainBuffer;
