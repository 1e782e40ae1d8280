//! chunked
//!
//! Pooled byte buffers for Rust.
//!
//! `chunked` cuts allocation churn for code that keeps allocating and
//! dropping byte buffers: read/write buffers, growing payloads, transfer
//! scratch space. It provides:
//!
//! - a size-classed buffer pool ([`Pool`])
//! - a growable byte stream stored as a chain of pooled chunks ([`ChunkedBuffer`])
//! - pool-backed appends ([`append`], [`append_bytes`])
//! - reader-to-writer copies through a pooled scratch chunk ([`copy`], [`copy_n`])
//!
//! The crate intentionally:
//! - does NOT track buffers that are never returned
//! - does NOT cap memory held by the pool
//! - does NOT synchronize access to a single [`ChunkedBuffer`]
//!
//! # Sync
//!
//! ```
//! use std::io::Write;
//! use chunked::{ChunkedBuffer, Error};
//!
//! fn main() -> Result<(), Error> {
//!     let mut buf = ChunkedBuffer::new();
//!     buf.write_all(b"hello, ")?;
//!     buf.extend_from_slice(b"world");
//!
//!     let mut out = Vec::new();
//!     buf.write_to(&mut out)?;
//!     assert_eq!(out, b"hello, world");
//!     Ok(())
//! }
//! ```
//!
//! # Async (feature = "async-io")
//!
//! ```ignore
//! use chunked::{ChunkedBuffer, Error};
//! use futures_io::AsyncRead;
//!
//! async fn slurp<R: AsyncRead + Unpin>(mut reader: R) -> Result<Vec<u8>, Error> {
//!     let mut buf = ChunkedBuffer::new();
//!     buf.read_from_async(&mut reader).await?;
//!     Ok(buf.contiguous())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod append;
mod buffer;
mod config;
mod copy;
mod error;
mod pool;

#[cfg(feature = "async-io")]
mod async_io;

//
// Public surface
//

pub use append::{append, append_bytes};
pub use buffer::ChunkedBuffer;
pub use config::{DEFAULT_LARGEST_CLASS, DEFAULT_SMALLEST_CLASS, PoolConfig};
pub use copy::{Plain, Sink, Source, copy, copy_n};
pub use error::Error;
pub use pool::{Pool, PooledChunk, get_chunk, get_largest_chunk, get_smallest_chunk, put_chunk};

#[cfg(feature = "async-io")]
pub use async_io::{copy_async, copy_n_async};
