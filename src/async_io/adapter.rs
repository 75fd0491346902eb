//! `futures-io` adapters for [`ChainBuffer`].
//!
//! # Example
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

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_io::{AsyncRead, AsyncWrite};

use crate::buffer::ChainBuffer;
use crate::error::BufferError;

/// Reads never wait: whatever is buffered is returned, `Ok(0)` at the end.
fn read_ready(buffer: &ChainBuffer, buf: &mut [u8]) -> Poll<io::Result<usize>> {
    Poll::Ready(match buffer.read(buf) {
        Ok(n) => Ok(n),
        Err(BufferError::EndOfData { read }) => Ok(read),
        Err(e) => Err(e.into()),
    })
}

fn write_segments(
    buffer: &ChainBuffer,
    cx: &mut Context<'_>,
    buf: &[u8],
) -> Poll<io::Result<usize>> {
    buffer.poll_write_segments(cx, buf).map_err(io::Error::from)
}

impl AsyncRead for ChainBuffer {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut [u8],
    ) -> Poll<io::Result<usize>> {
        read_ready(self.get_mut(), buf)
    }
}

impl AsyncRead for &ChainBuffer {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut [u8],
    ) -> Poll<io::Result<usize>> {
        read_ready(self.get_mut(), buf)
    }
}

impl AsyncWrite for ChainBuffer {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        write_segments(self.get_mut(), cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for &ChainBuffer {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        write_segments(self.get_mut(), cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
