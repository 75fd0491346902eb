//! `std::io` adapters so a [`ChainBuffer`] can sit behind any serializer.
//!
//! Short reads follow the `std::io` conventions: progress is reported as
//! `Ok(n)` and end of data as `Ok(0)`. Writes block for segments, so they
//! either copy everything or fail a capacity check up front.

use std::io::{self, Read, Write};

use super::ChainBuffer;
use crate::error::BufferError;

impl Write for &ChainBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        ChainBuffer::write(*self, buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Write for ChainBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Write::write(&mut &*self, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for &ChainBuffer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match ChainBuffer::read(*self, buf) {
            Ok(n) => Ok(n),
            Err(BufferError::EndOfData { read }) => Ok(read),
            Err(e) => Err(e.into()),
        }
    }
}

impl Read for ChainBuffer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Read::read(&mut &*self, buf)
    }
}
