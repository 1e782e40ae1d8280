//! Async reader/writer plumbing for [`ChunkedBuffer`].

use std::future::poll_fn;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_io::{AsyncRead, AsyncWrite};
use tracing::debug;

use crate::buffer::{ChunkedBuffer, Filler};
use crate::error::Error;

impl ChunkedBuffer<'_> {
    /// Async version of [`ChunkedBuffer::read_from`].
    ///
    /// Dropping the future part way keeps whatever was read up to that
    /// point, and no chunk is left behind empty.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use chunked::ChunkedBuffer;
    /// use tokio_util::compat::TokioAsyncReadCompatExt;
    ///
    /// async fn fill(file: tokio::fs::File) -> Result<ChunkedBuffer<'static>, chunked::Error> {
    ///     let mut buf = ChunkedBuffer::new();
    ///     buf.read_from_async(&mut file.compat()).await?;
    ///     Ok(buf)
    /// }
    /// ```
    pub async fn read_from_async<R>(&mut self, src: &mut R) -> Result<u64, Error>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let largest = self.pool().largest();
        let mut fill = Filler::new(self, largest);
        let mut n = 0u64;

        loop {
            let read = poll_fn(|cx| Pin::new(&mut *src).poll_read(cx, fill.spare())).await;
            match read {
                Ok(0) => return Ok(n),
                Ok(a) => {
                    fill.advance(a);
                    n += a as u64;
                }
                Err(e) => return Err(Error::io(n, e)),
            }
        }
    }

    /// Async version of [`ChunkedBuffer::write_to`].
    ///
    /// A short write stops draining with [`Error::ShortWrite`] and leaves the
    /// unsent bytes in the buffer. The writer is not flushed.
    pub async fn write_to_async<W>(&mut self, dst: &mut W) -> Result<u64, Error>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut n = 0u64;

        loop {
            let step = poll_fn(|cx| {
                let pending = self.front();
                let offered = pending.len();
                if offered == 0 {
                    return Poll::Ready(Ok(None));
                }
                Pin::new(&mut *dst)
                    .poll_write(cx, pending)
                    .map_ok(|written| Some((written.min(offered), offered)))
            })
            .await;

            let (written, offered) = match step {
                Ok(Some(step)) => step,
                Ok(None) => return Ok(n),
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

impl AsyncRead for ChunkedBuffer<'_> {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut [u8],
    ) -> Poll<io::Result<usize>> {
        Poll::Ready(Ok(self.get_mut().copy_out(buf)))
    }
}

impl AsyncWrite for ChunkedBuffer<'_> {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Poll::Ready(Ok(self.get_mut().extend_from_slice(buf)))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::{assert_pending, task};
    use tokio_util::compat::TokioAsyncWriteCompatExt;

    use super::*;
    use crate::pool::Pool;

    const BB: &[u8] = "abcdefghijklmnopqrstuvwxyzµᴃ𦤀".as_bytes();

    /// Accepts at most `limit` bytes per write.
    struct Trickle {
        out: Vec<u8>,
        limit: usize,
    }

    impl AsyncWrite for Trickle {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            let this = self.get_mut();
            let n = buf.len().min(this.limit);
            this.out.extend_from_slice(&buf[..n]);
            Poll::Ready(Ok(n))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    /// Yields its data once, then never becomes ready again.
    struct Stall<'a>(&'a [u8]);

    impl AsyncRead for Stall<'_> {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut [u8],
        ) -> Poll<io::Result<usize>> {
            let this = self.get_mut();
            if this.0.is_empty() {
                return Poll::Pending;
            }
            let n = buf.len().min(this.0.len());
            buf[..n].copy_from_slice(&this.0[..n]);
            this.0 = &this.0[n..];
            Poll::Ready(Ok(n))
        }
    }

    #[test]
    fn test_read_from_async_cancelled_before_any_read() {
        let pool = Pool::new(4, 4);
        let mut buf = ChunkedBuffer::with_pool(&pool);
        buf.extend_from_slice(b"abcd");

        let mut src = Stall(b"");
        {
            let mut fill = task::spawn(buf.read_from_async(&mut src));
            assert_pending!(fill.poll());
        }

        assert_eq!(buf.len(), 4);
        assert_eq!(buf.cap(), 4);
        assert_eq!(buf.last_byte(), b'd');
        assert_eq!(pool.idle(4), 1);
        assert_eq!(buf.contiguous(), b"abcd");
    }

    #[test]
    fn test_read_from_async_cancelled_mid_chunk() {
        let pool = Pool::new(4, 4);
        let mut buf = ChunkedBuffer::with_pool(&pool);
        buf.extend_from_slice(b"abcd");

        let mut src = Stall(b"ef");
        {
            let mut fill = task::spawn(buf.read_from_async(&mut src));
            assert_pending!(fill.poll());
        }

        assert_eq!(buf.len(), 6);
        assert_eq!(buf.cap(), 8);
        assert_eq!(buf.last_byte(), b'f');
        assert_eq!(buf.contiguous(), b"abcdef");

        // Writes resume right after the bytes that were read.
        buf.write_byte(b'g');
        assert_eq!(buf.cap(), 8);
        assert_eq!(buf.contiguous(), b"abcdefg");
    }

    #[tokio::test]
    async fn test_read_from_async() {
        let pool = Pool::new(8, 16);
        let mut buf = ChunkedBuffer::with_pool(&pool);

        let n = buf.read_from_async(&mut &BB[..]).await.unwrap();
        assert_eq!(n, BB.len() as u64);
        assert_eq!(buf.len(), BB.len());
        assert_eq!(buf.cap(), 48);
        assert_eq!(buf.contiguous(), BB);
    }

    #[tokio::test]
    async fn test_read_from_async_empty() {
        let pool = Pool::new(8, 16);
        let mut buf = ChunkedBuffer::with_pool(&pool);

        let n = buf.read_from_async(&mut &b""[..]).await.unwrap();
        assert_eq!(n, 0);
        assert_eq!(buf.cap(), 0);
    }

    #[tokio::test]
    async fn test_write_to_async() {
        let pool = Pool::new(8, 16);
        let mut buf = ChunkedBuffer::with_pool(&pool);
        buf.extend_from_slice(&BB[..26]);

        let mut out = Vec::<u8>::new().compat_write();
        let n = buf.write_to_async(&mut out).await.unwrap();
        assert_eq!(n, 26);
        assert_eq!(out.get_ref(), &BB[..26]);
        assert!(buf.is_empty());
        assert_eq!(buf.cap(), 0);
    }

    #[test]
    fn test_write_to_async_short_write() {
        let pool = Pool::new(8, 8);
        let mut buf = ChunkedBuffer::with_pool(&pool);
        buf.extend_from_slice(&BB[..20]);

        let mut dst = Trickle {
            out: Vec::new(),
            limit: 3,
        };
        let err = tokio_test::block_on(buf.write_to_async(&mut dst)).unwrap_err();
        assert!(matches!(err, Error::ShortWrite { transferred: 3 }));
        assert_eq!(dst.out, &BB[..3]);
        assert_eq!(buf.len(), 17);
        assert_eq!(buf.peek_byte(), BB[3]);
    }

    #[test]
    fn test_async_read_write_impls() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio_util::compat::FuturesAsyncReadCompatExt;

        tokio_test::block_on(async {
            let pool = Pool::new(4, 8);
            let mut buf = FuturesAsyncReadCompatExt::compat(ChunkedBuffer::with_pool(&pool));

            buf.write_all(BB).await.unwrap();
            assert_eq!(buf.get_ref().len(), BB.len());

            let mut out = Vec::new();
            buf.read_to_end(&mut out).await.unwrap();
            assert_eq!(out, BB);
            assert_eq!(buf.get_ref().cap(), 0);
        });
    }
}
