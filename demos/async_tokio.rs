//! Async buffering on tokio through the futures-io compat layer.
//!
//! Several producers fill their own chunked buffers concurrently, all
//! sharing the default pool.
//!
//! Run with:
//!     cargo run --example async_tokio --features async-io

use chunked::{ChunkedBuffer, copy_async};
use tokio::io::AsyncWriteExt;
use tokio_util::compat::{TokioAsyncReadCompatExt, TokioAsyncWriteCompatExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let sizes = [50_000usize, 120_000, 300_000];

    println!("Filling {} buffers concurrently...\n", sizes.len());

    let handles: Vec<_> = sizes
        .into_iter()
        .enumerate()
        .map(|(stream_id, size)| tokio::spawn(fill(stream_id, size)))
        .collect();

    for handle in handles {
        let (stream_id, len, cap) = handle.await??;
        println!("Stream {stream_id}: {len} bytes in {cap} bytes of chunks");
    }

    // Straight copy between two tokio endpoints
    let (mut tx, rx) = tokio::io::duplex(4096);
    let producer = tokio::spawn(async move {
        tx.write_all(&[7u8; 100_000]).await?;
        tx.shutdown().await
    });

    let mut out = Vec::<u8>::new().compat_write();
    let n = copy_async(&mut out, &mut rx.compat()).await?;
    producer.await??;
    println!("\nCopied {n} bytes through a pooled scratch chunk");

    Ok(())
}

async fn fill(
    stream_id: usize,
    size: usize,
) -> Result<(usize, usize, usize), Box<dyn std::error::Error + Send + Sync>> {
    let (mut tx, rx) = tokio::io::duplex(8192);
    let producer = tokio::spawn(async move {
        let data: Vec<u8> = (0..size).map(|i| (i % 256) as u8).collect();
        tx.write_all(&data).await
    });

    let mut buf = ChunkedBuffer::new();
    buf.read_from_async(&mut rx.compat()).await?;
    producer.await??;

    Ok((stream_id, buf.len(), buf.cap()))
}
