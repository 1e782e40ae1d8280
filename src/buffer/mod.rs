//! Chunked byte buffer built on the size-classed pool.
//!
//! - [`ChunkedBuffer`] - FIFO byte stream over pooled chunks

mod chunked;
mod transfer;

pub use chunked::ChunkedBuffer;
pub(crate) use chunked::Filler;
