//! Moving bytes in and out of a [`ChunkedBuffer`].
//!
//! - [`std::io::Read`] / [`std::io::Write`] for streaming use
//! - [`bytes::Buf`] for the `bytes` ecosystem
//! - [`ChunkedBuffer::read_from`] / [`ChunkedBuffer::write_to`] for bulk
//!   transfers that fill or drain whole chunks at a time

use std::io::{self, IoSlice, Read, Write};

use bytes::Buf;
use tracing::debug;

use super::{ChunkedBuffer, Filler};
use crate::error::Error;

impl ChunkedBuffer<'_> {
    /// Reads from `src` until it reports end of stream (`Ok(0)`).
    ///
    /// Chunks of the pool's largest class are pulled as each fills up.
    /// Returns the number of bytes read. Nothing is retried: an error from
    /// `src` ends the transfer as [`Error::Io`], and the bytes read before it
    /// stay in the buffer.
    pub fn read_from<R: Read + ?Sized>(&mut self, src: &mut R) -> Result<u64, Error> {
        let largest = self.pool().largest();
        let mut fill = Filler::new(self, largest);
        let mut n = 0u64;

        loop {
            match src.read(fill.spare()) {
                Ok(0) => return Ok(n),
                Ok(a) => {
                    fill.advance(a);
                    n += a as u64;
                }
                Err(e) => return Err(Error::io(n, e)),
            }
        }
    }

    /// Drains the buffer into `dst`, front to back.
    ///
    /// Every chunk written out completely goes back to the pool. If `dst`
    /// accepts fewer bytes than offered, draining stops with
    /// [`Error::ShortWrite`] and the unsent bytes stay in the buffer.
    pub fn write_to<W: Write + ?Sized>(&mut self, dst: &mut W) -> Result<u64, Error> {
        let mut n = 0u64;

        loop {
            let pending = self.front();
            let offered = pending.len();
            if offered == 0 {
                return Ok(n);
            }
            let written = match dst.write(pending) {
                Ok(written) => written.min(offered),
                Err(e) => return Err(Error::io(n, e)),
            };
            n += written as u64;
            self.consume(written);

            if written < offered {
                debug!(written, offered, "short write, keeping unsent bytes");
                return Err(Error::ShortWrite { transferred: n });
            }
        }
    }
}

impl Read for ChunkedBuffer<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.copy_out(buf))
    }
}

impl Write for ChunkedBuffer<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.extend_from_slice(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Buf for ChunkedBuffer<'_> {
    fn remaining(&self) -> usize {
        self.len()
    }

    fn chunk(&self) -> &[u8] {
        self.front()
    }

    fn advance(&mut self, cnt: usize) {
        assert!(
            cnt <= self.len(),
            "cannot advance past `remaining`: {:?} <= {:?}",
            cnt,
            self.len(),
        );
        self.consume(cnt);
    }

    fn chunks_vectored<'a>(&'a self, dst: &mut [IoSlice<'a>]) -> usize {
        let mut n = 0;
        for (slot, slice) in dst.iter_mut().zip(self.slices()) {
            *slot = IoSlice::new(slice);
            n += 1;
        }
        n
    }
}
