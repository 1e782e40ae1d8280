//! Async I/O support for the chunked buffer and the copy helpers.
//!
//! Built on `futures-io`, so it works with tokio (through `tokio-util`'s
//! compat layer), async-std, smol and any other futures-compatible runtime.
//!
//! - [`ChunkedBuffer::read_from_async`](crate::ChunkedBuffer::read_from_async)
//!   and [`ChunkedBuffer::write_to_async`](crate::ChunkedBuffer::write_to_async)
//! - [`copy_async`] / [`copy_n_async`]
//!
//! This module requires the `async-io` feature to be enabled.

mod buffer;
mod copy;

pub use copy::{copy_async, copy_n_async};
