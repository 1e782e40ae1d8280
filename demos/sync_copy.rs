//! Copying between readers and writers through pooled scratch space.
//!
//! Run with:
//!     cargo run --example sync_copy

use std::io::Cursor;

use chunked::{ChunkedBuffer, Error, Plain, append, copy, copy_n};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let data: Vec<u8> = (0..1_000_000u32).map(|i| (i % 251) as u8).collect();

    // Reader to buffer: the buffer pulls the reader in directly
    let mut buf = ChunkedBuffer::new();
    let n = copy(&mut buf, &mut Cursor::new(&data))?;
    println!("Buffered {n} bytes in {} bytes of chunks", buf.cap());

    // Buffer to writer: the buffer drains itself
    let mut out = Vec::new();
    let n = copy_n(&mut out, &mut buf, 4096)?;
    println!("Copied the first {n} bytes, {} still buffered", buf.len());

    // Neither side has a bulk path: one pooled scratch chunk is used
    let mut sink = Plain(std::io::sink());
    let n = copy(&mut sink, &mut Plain(&data[..]))?;
    println!("Streamed {n} bytes through scratch");

    // Asking for more than is there
    match copy_n(&mut out, &mut &b"short"[..], 100) {
        Err(Error::EndOfStream { transferred }) => {
            println!("Source ran dry after {transferred} bytes")
        }
        other => println!("Unexpected: {other:?}"),
    }

    // Growing a message with pooled appends
    let mut msg = Vec::new();
    for part in [&b"GET "[..], b"/index.html", b" HTTP/1.1\r\n"] {
        msg = append(msg, &[part]);
    }
    println!("Message {:?} (capacity {})", String::from_utf8_lossy(&msg), msg.capacity());

    Ok(())
}
