//! Error types for chunked.

use std::io;

/// Errors produced by the pool, the chunked buffer and the copy helpers.
///
/// Transfer errors carry the number of bytes moved before the failure, so a
/// partial transfer is never ambiguous. See [`Error::transferred`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A buffer handed back to the pool matches none of its size classes.
    ///
    /// The buffer is dropped instead of pooled.
    #[error("wrong chunk size: capacity {capacity} matches no size class")]
    WrongSize {
        /// Capacity of the rejected buffer.
        capacity: usize,
    },

    /// Invalid pool bounds.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },

    /// The source ended before the requested number of bytes was moved.
    #[error("unexpected end of stream after {transferred} bytes")]
    EndOfStream {
        /// Bytes moved before the source ran dry.
        transferred: u64,
    },

    /// The destination accepted fewer bytes than it was offered.
    #[error("short write after {transferred} bytes")]
    ShortWrite {
        /// Bytes accepted by the destination in total.
        transferred: u64,
    },

    /// The underlying reader or writer failed.
    #[error("io error after {transferred} bytes: {source}")]
    Io {
        /// Bytes moved before the failure.
        transferred: u64,
        /// The error reported by the reader or writer.
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Returns the number of bytes moved before this error occurred.
    ///
    /// Pool and configuration errors report zero.
    pub fn transferred(&self) -> u64 {
        match self {
            Error::EndOfStream { transferred }
            | Error::ShortWrite { transferred }
            | Error::Io { transferred, .. } => *transferred,
            Error::WrongSize { .. } | Error::InvalidConfig { .. } => 0,
        }
    }

    pub(crate) fn io(transferred: u64, source: io::Error) -> Self {
        Error::Io {
            transferred,
            source,
        }
    }
}

impl From<io::Error> for Error {
    fn from(source: io::Error) -> Self {
        Error::io(0, source)
    }
}

impl From<Error> for io::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Io { source, .. } => source,
            Error::EndOfStream { .. } => io::Error::new(io::ErrorKind::UnexpectedEof, e),
            Error::ShortWrite { .. } => io::Error::new(io::ErrorKind::WriteZero, e),
            Error::WrongSize { .. } | Error::InvalidConfig { .. } => {
                io::Error::new(io::ErrorKind::InvalidInput, e)
            }
        }
    }
}
