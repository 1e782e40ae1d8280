//! Size-classed pool of byte buffers.
//!
//! A [`Pool`] keeps one free-list per power-of-two size class between a
//! smallest and a largest class. [`Pool::get`] hands out an empty `Vec<u8>`
//! whose capacity is exactly the nearest class, [`Pool::put`] takes it back.
//! The pool does no accounting of loaned buffers: whatever is not put back
//! is simply freed by its owner.
//!
//! Each class is an independent lock-free queue, so `get` and `put` can be
//! called from any number of threads without external locking.
//!
//! # Example
//!
//! ```
//! use chunked::Pool;
//!
//! let pool = Pool::new(128, 4096);
//!
//! let mut buf = pool.get(150);
//! assert_eq!(buf.capacity(), 256);
//! buf.extend_from_slice(b"hello");
//!
//! pool.put(buf)?;
//! assert_eq!(pool.get(200).len(), 0);
//! # Ok::<(), chunked::Error>(())
//! ```

mod chunk;

use std::sync::LazyLock;

use crossbeam_queue::SegQueue;
use tracing::{debug, trace};

use crate::config::PoolConfig;
use crate::error::Error;

pub use chunk::PooledChunk;

/// Process-wide pool used by every caller that does not bring its own.
static DEFAULT_POOL: LazyLock<Pool> = LazyLock::new(Pool::default);

/// A set of free-lists, one per power-of-two size class.
#[derive(Debug)]
pub struct Pool {
    /// `ilog2(smallest)`, subtracted from `ilog2(size)` to index `classes`.
    shift: u32,
    smallest: usize,
    largest: usize,
    classes: Box<[SegQueue<Vec<u8>>]>,
}

impl Pool {
    /// Creates a pool managing every power of two in `[smallest, largest]`.
    ///
    /// # Panics
    ///
    /// Panics if `smallest > largest`, if `smallest` is zero or not a power
    /// of two, or if `largest` is not a power of two. Use
    /// [`Pool::from_config`] to validate untrusted bounds instead.
    pub fn new(smallest: usize, largest: usize) -> Self {
        match PoolConfig::new(smallest, largest) {
            Ok(config) => Self::build(config),
            Err(e) => panic!("chunked::Pool: {e}"),
        }
    }

    /// Creates a pool from a configuration, validating it first.
    pub fn from_config(config: PoolConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: PoolConfig) -> Self {
        let shift = config.smallest().ilog2();
        let count = (config.largest().ilog2() - shift) as usize + 1;

        Self {
            shift,
            smallest: config.smallest(),
            largest: config.largest(),
            classes: (0..count).map(|_| SegQueue::new()).collect(),
        }
    }

    /// Returns the process-wide default pool (256 B to 256 KiB).
    ///
    /// It is created on first use and never torn down.
    pub fn global() -> &'static Pool {
        &DEFAULT_POOL
    }

    /// Returns the smallest size class.
    pub fn smallest(&self) -> usize {
        self.smallest
    }

    /// Returns the largest size class.
    pub fn largest(&self) -> usize {
        self.largest
    }

    /// Returns the number of size classes.
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Returns the size class serving a request of `size` bytes.
    ///
    /// Requests below the smallest class are clamped up to it, requests
    /// above the largest class are clamped down to it, everything else is
    /// rounded up to the next power of two.
    pub fn nearest(&self, size: usize) -> usize {
        if size < self.smallest {
            self.smallest
        } else if size > self.largest {
            self.largest
        } else {
            size.next_power_of_two()
        }
    }

    /// Takes an empty buffer of the nearest class from the pool, allocating
    /// one if the class has none to spare.
    ///
    /// The returned buffer always has length 0 and a capacity equal to
    /// `self.nearest(size)`.
    pub fn get(&self, size: usize) -> Vec<u8> {
        let size = self.nearest(size);
        if let Some(chunk) = self.class(size).pop() {
            return chunk;
        }
        trace!(size, "size class empty, allocating chunk");
        Vec::with_capacity(size)
    }

    /// Returns a buffer to the free-list matching its capacity.
    ///
    /// The buffer is cleared before it is stored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WrongSize`] if the capacity is not a power of two
    /// within `[smallest, largest]`. The buffer is dropped in that case.
    pub fn put(&self, mut chunk: Vec<u8>) -> Result<(), Error> {
        let capacity = chunk.capacity();
        if !self.is_class(capacity) {
            debug!(capacity, "dropping chunk that matches no size class");
            return Err(Error::WrongSize { capacity });
        }
        chunk.clear();
        self.class(capacity).push(chunk);
        Ok(())
    }

    /// Takes a buffer like [`Pool::get`], wrapped in a guard that puts it
    /// back when dropped.
    pub fn scoped(&self, size: usize) -> PooledChunk<'_> {
        PooledChunk::new(self, self.get(size))
    }

    /// Returns the number of idle buffers in the class serving `size`.
    pub fn idle(&self, size: usize) -> usize {
        self.class(self.nearest(size)).len()
    }

    /// Whether `size` is exactly one of the pool's size classes.
    pub(crate) fn is_class(&self, size: usize) -> bool {
        self.smallest <= size && size <= self.largest && size.is_power_of_two()
    }

    fn class(&self, size: usize) -> &SegQueue<Vec<u8>> {
        &self.classes[(size.ilog2() - self.shift) as usize]
    }
}

impl Default for Pool {
    fn default() -> Self {
        Self::build(PoolConfig::default())
    }
}

/// Takes a buffer serving `size` bytes from the default pool.
pub fn get_chunk(size: usize) -> Vec<u8> {
    Pool::global().get(size)
}

/// Takes a buffer of the smallest class from the default pool.
pub fn get_smallest_chunk() -> Vec<u8> {
    let pool = Pool::global();
    pool.get(pool.smallest())
}

/// Takes a buffer of the largest class from the default pool.
pub fn get_largest_chunk() -> Vec<u8> {
    let pool = Pool::global();
    pool.get(pool.largest())
}

/// Returns a buffer to the default pool.
pub fn put_chunk(chunk: Vec<u8>) -> Result<(), Error> {
    Pool::global().put(chunk)
}
