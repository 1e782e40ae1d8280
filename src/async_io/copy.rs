//! Async reader-to-writer copies through a pooled scratch chunk.

use std::future::poll_fn;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures_io::{AsyncRead, AsyncWrite};
use pin_project_lite::pin_project;

use crate::error::Error;
use crate::pool::Pool;

pin_project! {
    /// Reader adapter that reports end of stream after `limit` bytes.
    #[derive(Debug)]
    struct Limited<R> {
        #[pin]
        inner: R,
        limit: u64,
    }
}

impl<R: AsyncRead> AsyncRead for Limited<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut [u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.project();
        if *this.limit == 0 {
            return Poll::Ready(Ok(0));
        }
        let max = buf.len().min(usize::try_from(*this.limit).unwrap_or(usize::MAX));
        let n = ready!(this.inner.poll_read(cx, &mut buf[..max]))?;
        *this.limit -= n as u64;
        Poll::Ready(Ok(n))
    }
}

/// Async version of [`copy`](crate::copy).
///
/// Always goes through one scratch chunk of the default pool's largest
/// class, which is returned to the pool however the copy ends, including
/// when the future is dropped.
///
/// # Example
///
/// ```ignore
/// use chunked::copy_async;
/// use tokio_util::compat::{TokioAsyncReadCompatExt, TokioAsyncWriteCompatExt};
///
/// async fn pipe(src: tokio::fs::File, dst: tokio::fs::File) -> Result<u64, chunked::Error> {
///     copy_async(&mut dst.compat_write(), &mut src.compat()).await
/// }
/// ```
pub async fn copy_async<W, R>(dst: &mut W, src: &mut R) -> Result<u64, Error>
where
    W: AsyncWrite + Unpin + ?Sized,
    R: AsyncRead + Unpin + ?Sized,
{
    copy_async_via(Pool::global(), dst, src).await
}

/// Async version of [`copy_n`](crate::copy_n).
///
/// # Errors
///
/// Returns [`Error::EndOfStream`] if `src` ran dry before `limit` bytes were
/// moved and nothing else went wrong.
pub async fn copy_n_async<W, R>(dst: &mut W, src: &mut R, limit: u64) -> Result<u64, Error>
where
    W: AsyncWrite + Unpin + ?Sized,
    R: AsyncRead + Unpin + ?Sized,
{
    copy_n_async_via(Pool::global(), dst, src, limit).await
}

async fn copy_async_via<W, R>(pool: &Pool, dst: &mut W, src: &mut R) -> Result<u64, Error>
where
    W: AsyncWrite + Unpin + ?Sized,
    R: AsyncRead + Unpin + ?Sized,
{
    let mut scratch = pool.scoped(pool.largest());
    let size = scratch.capacity();
    scratch.resize(size, 0);

    let mut n = 0u64;
    loop {
        let read = match poll_fn(|cx| Pin::new(&mut *src).poll_read(cx, &mut scratch)).await {
            Ok(0) => return Ok(n),
            Ok(read) => read,
            Err(e) => return Err(Error::io(n, e)),
        };
        let written =
            match poll_fn(|cx| Pin::new(&mut *dst).poll_write(cx, &scratch[..read])).await {
                Ok(written) => written.min(read),
                Err(e) => return Err(Error::io(n, e)),
            };
        n += written as u64;
        if written < read {
            return Err(Error::ShortWrite { transferred: n });
        }
    }
}

async fn copy_n_async_via<W, R>(
    pool: &Pool,
    dst: &mut W,
    src: &mut R,
    limit: u64,
) -> Result<u64, Error>
where
    W: AsyncWrite + Unpin + ?Sized,
    R: AsyncRead + Unpin + ?Sized,
{
    let mut limited = Limited { inner: src, limit };
    let n = copy_async_via(pool, dst, &mut limited).await?;
    if n < limit {
        return Err(Error::EndOfStream { transferred: n });
    }
    Ok(n)
}
