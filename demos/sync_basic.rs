//! Basic synchronous use of the pool and the chunked buffer.
//!
//! Run with:
//!     cargo run --example sync_basic

use std::io::{Read, Write};

use chunked::{ChunkedBuffer, Pool};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A small pool so the chunk boundaries are easy to see
    let pool = Pool::new(64, 1024);

    let mut buf = ChunkedBuffer::with_pool(&pool);
    for i in 0..100 {
        writeln!(buf, "line {i:03}")?;
    }
    println!(
        "Wrote {} bytes into {} bytes of pooled chunks",
        buf.len(),
        buf.cap()
    );

    // Read a fixed-size header, then drain the rest
    let mut header = [0u8; 9];
    buf.read_exact(&mut header)?;
    println!("First line: {:?}", String::from_utf8_lossy(&header).trim_end());

    let mut rest = Vec::new();
    let n = buf.write_to(&mut rest)?;
    println!("Drained {n} bytes, {} left in the buffer", buf.len());

    // Drained chunks went back to the pool for the next user
    println!("Idle 64 B chunks: {}", pool.idle(64));

    // Scoped chunks return themselves on drop
    {
        let mut scratch = pool.scoped(300);
        scratch.extend_from_slice(b"temporary");
        println!("Scratch chunk capacity: {}", scratch.capacity());
    }
    println!("Idle 512 B chunks: {}", pool.idle(512));

    Ok(())
}
