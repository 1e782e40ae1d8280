//! Scoped pool chunk that finds its own way home.

use std::fmt;
use std::mem;
use std::ops::{Deref, DerefMut};

use super::Pool;

/// A buffer borrowed from a [`Pool`] that is put back when dropped.
///
/// Dereferences to the underlying `Vec<u8>`. Growing it past its capacity
/// reallocates, and the pool then rejects it on drop; the buffer is freed
/// instead.
///
/// # Example
///
/// ```
/// use chunked::Pool;
///
/// let pool = Pool::new(64, 1024);
/// {
///     let mut scratch = pool.scoped(100);
///     scratch.extend_from_slice(b"temporary");
///     assert_eq!(scratch.capacity(), 128);
/// }
/// assert_eq!(pool.idle(128), 1);
/// ```
pub struct PooledChunk<'p> {
    pool: &'p Pool,
    data: Vec<u8>,
}

impl<'p> PooledChunk<'p> {
    pub(crate) fn new(pool: &'p Pool, data: Vec<u8>) -> Self {
        Self { pool, data }
    }

    /// Detaches the buffer from the guard. It is no longer returned
    /// automatically.
    pub fn into_inner(mut self) -> Vec<u8> {
        mem::take(&mut self.data)
    }

    /// Returns the pool this chunk goes back to.
    pub fn pool(&self) -> &'p Pool {
        self.pool
    }
}

impl Deref for PooledChunk<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.data
    }
}

impl DerefMut for PooledChunk<'_> {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.data
    }
}

impl fmt::Debug for PooledChunk<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledChunk")
            .field("len", &self.data.len())
            .field("capacity", &self.data.capacity())
            .finish()
    }
}

impl Drop for PooledChunk<'_> {
    fn drop(&mut self) {
        // Detached by into_inner.
        if self.data.capacity() == 0 {
            return;
        }
        let _ = self.pool.put(mem::take(&mut self.data));
    }
}
