//! Async I/O support for chained buffers.
//!
//! This module implements the `futures-io` traits for [`ChainBuffer`],
//! making it runtime-agnostic and compatible with tokio (through
//! `tokio_util::compat`), async-std, smol, and other async runtimes.
//!
//! Writes that need a segment while the pool is exhausted park the task
//! at the pool's permit gate instead of blocking the thread.
//!
//! This module requires the `async-io` feature to be enabled.
//!
//! [`ChainBuffer`]: crate::ChainBuffer

mod adapter;
