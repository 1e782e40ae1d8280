//! Reader-to-writer copies that avoid per-call scratch allocation.
//!
//! [`copy`] hands the whole transfer to either side when it can move bytes
//! in bulk (a [`ChunkedBuffer`] can do both), and otherwise shuttles data
//! through a single scratch chunk borrowed from the pool.
//!
//! Which endpoints offer bulk transfer is expressed by the [`Source`] and
//! [`Sink`] traits. They are implemented for the usual std readers and
//! writers; wrap anything else in [`Plain`].
//!
//! # Example
//!
//! ```
//! use chunked::{copy, copy_n, ChunkedBuffer, Error};
//!
//! let mut buf = ChunkedBuffer::new();
//! let n = copy(&mut buf, &mut &b"hello world"[..])?;
//! assert_eq!(n, 11);
//!
//! let mut out = Vec::new();
//! let err = copy_n(&mut out, &mut buf, 20).unwrap_err();
//! assert!(matches!(err, Error::EndOfStream { transferred: 11 }));
//! assert_eq!(out, b"hello world");
//! # Ok::<(), chunked::Error>(())
//! ```

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, Read, Write};
use std::net::TcpStream;

use crate::buffer::ChunkedBuffer;
use crate::error::Error;
use crate::pool::Pool;

/// A reader that may be able to write itself out in bulk.
pub trait Source: Read {
    /// Writes everything this source holds into `dst`, bypassing any
    /// scratch buffer. Returns `None` if the source has no bulk path.
    fn write_to_sink(&mut self, dst: &mut dyn Write) -> Option<Result<u64, Error>> {
        let _ = dst;
        None
    }
}

/// A writer that may be able to pull a whole reader in bulk.
pub trait Sink: Write {
    /// Reads `src` to its end into this sink, bypassing any scratch buffer.
    /// Returns `None` if the sink has no bulk path.
    fn read_from_source(&mut self, src: &mut dyn Read) -> Option<Result<u64, Error>> {
        let _ = src;
        None
    }
}

/// Adapts any reader or writer into a [`Source`] or [`Sink`] without a bulk
/// path.
#[derive(Debug, Clone, Default)]
pub struct Plain<T>(pub T);

impl<T: Read> Read for Plain<T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl<T: Write> Write for Plain<T> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<T: Read> Source for Plain<T> {}
impl<T: Write> Sink for Plain<T> {}

impl Source for ChunkedBuffer<'_> {
    fn write_to_sink(&mut self, dst: &mut dyn Write) -> Option<Result<u64, Error>> {
        Some(self.write_to(dst))
    }
}

impl Sink for ChunkedBuffer<'_> {
    fn read_from_source(&mut self, src: &mut dyn Read) -> Option<Result<u64, Error>> {
        Some(self.read_from(src))
    }
}

impl<T: Source + ?Sized> Source for &mut T {
    fn write_to_sink(&mut self, dst: &mut dyn Write) -> Option<Result<u64, Error>> {
        (**self).write_to_sink(dst)
    }
}

impl<T: Sink + ?Sized> Sink for &mut T {
    fn read_from_source(&mut self, src: &mut dyn Read) -> Option<Result<u64, Error>> {
        (**self).read_from_source(src)
    }
}

impl<T: Source + ?Sized> Source for Box<T> {
    fn write_to_sink(&mut self, dst: &mut dyn Write) -> Option<Result<u64, Error>> {
        (**self).write_to_sink(dst)
    }
}

impl<T: Sink + ?Sized> Sink for Box<T> {
    fn read_from_source(&mut self, src: &mut dyn Read) -> Option<Result<u64, Error>> {
        (**self).read_from_source(src)
    }
}

macro_rules! plain_source {
    ($($ty:ty),* $(,)?) => {
        $(impl Source for $ty {})*
    };
}

macro_rules! plain_sink {
    ($($ty:ty),* $(,)?) => {
        $(impl Sink for $ty {})*
    };
}

plain_source!(
    &[u8],
    VecDeque<u8>,
    File,
    &File,
    TcpStream,
    &TcpStream,
    io::Stdin,
    io::StdinLock<'_>,
    io::Empty,
    io::Repeat,
);

plain_sink!(
    Vec<u8>,
    VecDeque<u8>,
    io::Cursor<Vec<u8>>,
    io::Cursor<&mut Vec<u8>>,
    io::Cursor<&mut [u8]>,
    io::Cursor<Box<[u8]>>,
    File,
    &File,
    TcpStream,
    &TcpStream,
    io::Stdout,
    io::StdoutLock<'_>,
    io::Stderr,
    io::StderrLock<'_>,
    io::Sink,
);

impl<T: AsRef<[u8]>> Source for io::Cursor<T> {}
impl<R: Read> Source for io::BufReader<R> {}
impl<T: Read> Source for io::Take<T> {}
impl<A: Read, B: Read> Source for io::Chain<A, B> {}
impl<W: Write> Sink for io::BufWriter<W> {}
impl<W: Write> Sink for io::LineWriter<W> {}

/// Copies `src` into `dst` until `src` reports end of stream.
///
/// If `src` can write itself out in bulk, the copy is delegated to it;
/// failing that, if `dst` can pull in bulk, to `dst`. Otherwise one scratch
/// chunk of the default pool's largest class carries the data and goes back
/// to the pool however the copy ends.
///
/// End of stream is not an error. A destination that accepts fewer bytes
/// than offered ends the copy with [`Error::ShortWrite`]; reader and writer
/// failures are returned as [`Error::Io`]. Every error reports the bytes
/// moved before it.
pub fn copy<W, R>(dst: &mut W, src: &mut R) -> Result<u64, Error>
where
    W: Sink,
    R: Source,
{
    copy_via(Pool::global(), dst, src)
}

/// Like [`copy`], but moves at most `limit` bytes.
///
/// # Errors
///
/// Returns [`Error::EndOfStream`] if `src` ran dry before `limit` bytes were
/// moved and nothing else went wrong.
pub fn copy_n<W, R>(dst: &mut W, src: &mut R, limit: u64) -> Result<u64, Error>
where
    W: Sink,
    R: Source,
{
    copy_n_via(Pool::global(), dst, src, limit)
}

pub(crate) fn copy_via<W, R>(pool: &Pool, dst: &mut W, src: &mut R) -> Result<u64, Error>
where
    W: Sink,
    R: Source,
{
    if let Some(result) = src.write_to_sink(&mut *dst) {
        return result;
    }
    if let Some(result) = dst.read_from_source(&mut *src) {
        return result;
    }
    copy_scratch(pool, dst, src)
}

pub(crate) fn copy_n_via<W, R>(
    pool: &Pool,
    dst: &mut W,
    src: &mut R,
    limit: u64,
) -> Result<u64, Error>
where
    W: Sink,
    R: Source,
{
    let mut limited = Read::take(src, limit);
    let n = copy_via(pool, dst, &mut limited)?;
    if n < limit {
        return Err(Error::EndOfStream { transferred: n });
    }
    Ok(n)
}

fn copy_scratch<W, R>(pool: &Pool, dst: &mut W, src: &mut R) -> Result<u64, Error>
where
    W: Write + ?Sized,
    R: Read + ?Sized,
{
    let mut scratch = pool.scoped(pool.largest());
    let size = scratch.capacity();
    scratch.resize(size, 0);

    let mut n = 0u64;
    loop {
        let read = match src.read(&mut scratch) {
            Ok(0) => return Ok(n),
            Ok(read) => read,
            Err(e) => return Err(Error::io(n, e)),
        };
        let written = match dst.write(&scratch[..read]) {
            Ok(written) => written.min(read),
            Err(e) => return Err(Error::io(n, e)),
        };
        n += written as u64;
        if written < read {
            return Err(Error::ShortWrite { transferred: n });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accepts at most `limit` bytes in total.
    struct Capped {
        out: Vec<u8>,
        limit: usize,
    }

    impl Write for Capped {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let n = buf.len().min(self.limit - self.out.len());
            self.out.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Sink for Capped {}

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::TimedOut, "timed out"))
        }
    }

    impl Source for Broken {}

    fn payload(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 + 13) as u8).collect()
    }

    #[test]
    fn test_copy_through_scratch() {
        let pool = Pool::new(8, 16);
        let data = payload(100);
        let mut out = Vec::new();

        let n = copy_via(&pool, &mut out, &mut &data[..]).unwrap();
        assert_eq!(n, 100);
        assert_eq!(out, data);
        assert_eq!(pool.idle(16), 1);
    }

    #[test]
    fn test_copy_empty_source() {
        let pool = Pool::new(8, 16);
        let mut out = Vec::new();
        assert_eq!(copy_via(&pool, &mut out, &mut io::empty()).unwrap(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_copy_from_chunked_buffer_delegates() {
        let pool = Pool::new(8, 16);
        let mut buf = ChunkedBuffer::with_pool(&pool);
        buf.extend_from_slice(&payload(40));

        let scratch_pool = Pool::new(8, 16);
        let mut out = Vec::new();
        let n = copy_via(&scratch_pool, &mut out, &mut buf).unwrap();
        assert_eq!(n, 40);
        assert_eq!(out, payload(40));
        assert!(buf.is_empty());
        // No scratch chunk was needed.
        assert_eq!(scratch_pool.idle(16), 0);
    }

    #[test]
    fn test_copy_into_chunked_buffer_delegates() {
        let pool = Pool::new(8, 16);
        let mut buf = ChunkedBuffer::with_pool(&pool);

        let scratch_pool = Pool::new(8, 16);
        let data = payload(50);
        let n = copy_via(&scratch_pool, &mut buf, &mut &data[..]).unwrap();
        assert_eq!(n, 50);
        assert_eq!(buf.contiguous(), data);
        assert_eq!(scratch_pool.idle(16), 0);
    }

    #[test]
    fn test_copy_between_chunked_buffers() {
        let pool = Pool::new(8, 16);
        let mut src = ChunkedBuffer::with_pool(&pool);
        let mut dst = ChunkedBuffer::with_pool(&pool);
        src.extend_from_slice(b"chunk to chunk");

        assert_eq!(copy(&mut dst, &mut src).unwrap(), 14);
        assert!(src.is_empty());
        assert_eq!(dst.contiguous(), b"chunk to chunk");
    }

    #[test]
    fn test_copy_plain_wrappers() {
        let data = payload(1000);
        let mut out = Plain(Vec::new());
        let n = copy(&mut out, &mut Plain(&data[..])).unwrap();
        assert_eq!(n, 1000);
        assert_eq!(out.0, data);
    }

    #[test]
    fn test_copy_short_write() {
        let pool = Pool::new(8, 16);
        let data = payload(40);
        let mut dst = Capped {
            out: Vec::new(),
            limit: 20,
        };

        let err = copy_via(&pool, &mut dst, &mut &data[..]).unwrap_err();
        assert!(matches!(err, Error::ShortWrite { transferred: 20 }));
        assert_eq!(dst.out, &data[..20]);
        assert_eq!(pool.idle(16), 1);
    }

    #[test]
    fn test_copy_read_error() {
        let pool = Pool::new(8, 16);
        let mut out = Vec::new();
        let err = copy_via(&pool, &mut out, &mut Broken).unwrap_err();
        assert!(matches!(err, Error::Io { transferred: 0, ref source } if source.kind() == io::ErrorKind::TimedOut));
        assert_eq!(pool.idle(16), 1);
    }

    #[test]
    fn test_copy_n_exact() {
        let pool = Pool::new(8, 16);
        let data = payload(100);
        let mut src = &data[..];
        let mut out = Vec::new();

        assert_eq!(copy_n_via(&pool, &mut out, &mut src, 30).unwrap(), 30);
        assert_eq!(out, &data[..30]);
        assert_eq!(src.len(), 70);
    }

    #[test]
    fn test_copy_n_source_too_short() {
        let pool = Pool::new(8, 16);
        let data = payload(10);
        let mut out = Vec::new();

        let err = copy_n_via(&pool, &mut out, &mut &data[..], 25).unwrap_err();
        assert!(matches!(err, Error::EndOfStream { transferred: 10 }));
        assert_eq!(out, data);
    }

    #[test]
    fn test_copy_n_from_chunked_buffer_leaves_rest() {
        let pool = Pool::new(8, 16);
        let mut buf = ChunkedBuffer::with_pool(&pool);
        buf.extend_from_slice(&payload(50));

        let mut out = Vec::new();
        assert_eq!(copy_n_via(&pool, &mut out, &mut buf, 20).unwrap(), 20);
        assert_eq!(out, &payload(50)[..20]);
        assert_eq!(buf.len(), 30);
        assert_eq!(buf.peek_byte(), payload(50)[20]);
    }

    #[test]
    fn test_copy_n_into_chunked_buffer() {
        let pool = Pool::new(8, 16);
        let mut buf = ChunkedBuffer::with_pool(&pool);
        let data = payload(50);

        assert_eq!(copy_n(&mut buf, &mut &data[..], 35).unwrap(), 35);
        assert_eq!(buf.contiguous(), &data[..35]);
    }

    #[test]
    fn test_copy_n_zero() {
        let mut out = Vec::new();
        assert_eq!(copy_n(&mut out, &mut &b"abc"[..], 0).unwrap(), 0);
        assert!(out.is_empty());
    }
}
