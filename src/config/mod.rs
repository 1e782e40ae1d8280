//! Configuration for pool size classes.
//!
//! - [`PoolConfig`] - Smallest and largest size class of a [`Pool`](crate::Pool)
//!
//! # Example
//!
//! ```
//! use chunked::{Pool, PoolConfig};
//!
//! let config = PoolConfig::new(512, 64 * 1024)?;
//! let pool = Pool::from_config(config)?;
//! assert_eq!(pool.class_count(), 8);
//! # Ok::<(), chunked::Error>(())
//! ```

use crate::error::Error;

/// Default smallest size class (256 B).
pub const DEFAULT_SMALLEST_CLASS: usize = 1 << 8;

/// Default largest size class (256 KiB).
pub const DEFAULT_LARGEST_CLASS: usize = 1 << 18;

/// Bounds of the size classes managed by a pool.
///
/// Both bounds must be non-zero powers of two with `smallest <= largest`.
/// Every power of two in between is a size class.
///
/// # Example
///
/// ```
/// use chunked::PoolConfig;
///
/// let config = PoolConfig::default()
///     .with_smallest(1024)
///     .with_largest(1024 * 1024);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolConfig {
    smallest: usize,
    largest: usize,
}

impl PoolConfig {
    /// Creates a new configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if:
    /// - `smallest > largest`
    /// - `smallest` is zero or not a power of 2
    /// - `largest` is not a power of 2
    pub fn new(smallest: usize, largest: usize) -> Result<Self, Error> {
        if smallest > largest {
            return Err(Error::InvalidConfig {
                message: "the smallest chunk size must be less than or equal to the largest chunk size",
            });
        }

        if !smallest.is_power_of_two() {
            return Err(Error::InvalidConfig {
                message: "the smallest chunk size must be greater than zero and a power of 2",
            });
        }

        if !largest.is_power_of_two() {
            return Err(Error::InvalidConfig {
                message: "the largest chunk size must be a power of 2",
            });
        }

        Ok(Self { smallest, largest })
    }

    /// Sets the smallest size class.
    ///
    /// Note: This does not validate the configuration. Use
    /// [`PoolConfig::validate`] to check it.
    pub fn with_smallest(mut self, size: usize) -> Self {
        self.smallest = size;
        self
    }

    /// Sets the largest size class.
    ///
    /// Note: This does not validate the configuration. Use
    /// [`PoolConfig::validate`] to check it.
    pub fn with_largest(mut self, size: usize) -> Self {
        self.largest = size;
        self
    }

    /// Returns the smallest size class.
    pub fn smallest(&self) -> usize {
        self.smallest
    }

    /// Returns the largest size class.
    pub fn largest(&self) -> usize {
        self.largest
    }

    /// Validates the current configuration.
    pub fn validate(&self) -> Result<(), Error> {
        Self::new(self.smallest, self.largest).map(|_| ())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            smallest: DEFAULT_SMALLEST_CLASS,
            largest: DEFAULT_LARGEST_CLASS,
        }
    }
}
