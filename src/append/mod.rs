//! Pool-backed appends to a single `Vec<u8>`.
//!
//! These behave like concatenation but take any replacement buffer from the
//! pool, so a buffer that keeps growing moves through size classes instead
//! of going through the allocator on every step.

use tracing::debug;

use crate::pool::Pool;

impl Pool {
    /// Returns `dst` followed by every slice in `parts`.
    ///
    /// If `dst` already has the capacity, it is extended in place. Otherwise
    /// the result is a new buffer, taken from the pool when it fits the
    /// largest class, and the old `dst` is offered back to the pool. If all
    /// parts are empty, `dst` is returned untouched.
    ///
    /// # Example
    ///
    /// ```
    /// use chunked::Pool;
    ///
    /// let pool = Pool::new(16, 1024);
    /// let out = pool.append(vec![1, 2, 3], &[&[4], &[5]]);
    /// assert_eq!(out, [1, 2, 3, 4, 5]);
    /// assert_eq!(out.capacity(), 16);
    /// ```
    pub fn append(&self, dst: Vec<u8>, parts: &[&[u8]]) -> Vec<u8> {
        let extra: usize = parts.iter().map(|part| part.len()).sum();
        if extra == 0 {
            return dst;
        }
        let total = dst.len() + extra;
        let mut out = self.grow(dst, total);
        for part in parts {
            out.extend_from_slice(part);
        }
        out
    }

    /// Returns `dst` followed by `bytes`, with the same growth rules as
    /// [`Pool::append`].
    pub fn append_bytes<I>(&self, dst: Vec<u8>, bytes: I) -> Vec<u8>
    where
        I: IntoIterator<Item = u8>,
        I::IntoIter: ExactSizeIterator,
    {
        let bytes = bytes.into_iter();
        let extra = bytes.len();
        if extra == 0 {
            return dst;
        }
        let total = dst.len() + extra;
        let mut out = self.grow(dst, total);
        out.extend(bytes);
        out
    }

    /// Makes sure the contents of `dst` sit in a buffer holding `total` bytes.
    fn grow(&self, dst: Vec<u8>, total: usize) -> Vec<u8> {
        if total <= dst.capacity() {
            return dst;
        }
        let mut out = if total > self.largest() {
            debug!(
                total,
                largest = self.largest(),
                "append exceeds largest size class, allocating outside the pool"
            );
            Vec::with_capacity(total.next_power_of_two())
        } else {
            self.get(total)
        };
        out.extend_from_slice(&dst);
        // Caller-supplied buffers often match no class; those are just freed.
        let _ = self.put(dst);
        out
    }
}

/// [`Pool::append`] on the default pool.
pub fn append(dst: Vec<u8>, parts: &[&[u8]]) -> Vec<u8> {
    Pool::global().append(dst, parts)
}

/// [`Pool::append_bytes`] on the default pool.
pub fn append_bytes<I>(dst: Vec<u8>, bytes: I) -> Vec<u8>
where
    I: IntoIterator<Item = u8>,
    I::IntoIter: ExactSizeIterator,
{
    Pool::global().append_bytes(dst, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_capacity(capacity: usize, payload: &[u8]) -> Vec<u8> {
        let mut v = Vec::with_capacity(capacity.max(payload.len()));
        v.extend_from_slice(payload);
        v
    }

    #[test]
    fn test_append() {
        let cases: [(Vec<u8>, &[&[u8]], &[u8]); 12] = [
            (Vec::new(), &[], &[]),
            (Vec::new(), &[&[]], &[]),
            (Vec::new(), &[b"123"], b"123"),
            (Vec::new(), &[b"1", b"2", b"3"], b"123"),
            (Vec::with_capacity(0), &[b"123"], b"123"),
            (Vec::with_capacity(2), &[b"1", b"2", b"3"], b"123"),
            (b"123".to_vec(), &[], b"123"),
            (b"123".to_vec(), &[&[]], b"123"),
            (b"123".to_vec(), &[b"4", b"5"], b"12345"),
            (b"123".to_vec(), &[b"45"], b"12345"),
            (with_capacity(16, b"123"), &[b"4", b"5"], b"12345"),
            (with_capacity(16, b"123"), &[b"45"], b"12345"),
        ];
        for (i, (dst, parts, expected)) in cases.into_iter().enumerate() {
            assert_eq!(append(dst, parts), expected, "case {i}");
        }
    }

    #[test]
    fn test_append_empty_parts_returns_dst() {
        let dst = b"123".to_vec();
        let ptr = dst.as_ptr();
        let out = append(dst, &[&[], &[]]);
        assert_eq!(out.as_ptr(), ptr);
        assert_eq!(out, b"123");
    }

    #[test]
    fn test_append_in_place() {
        let dst = with_capacity(16, b"123");
        let ptr = dst.as_ptr();
        let out = append(dst, &[b"4", b"5"]);
        assert_eq!(out.as_ptr(), ptr);
        assert_eq!(out.capacity(), 16);
    }

    #[test]
    fn test_append_grows_from_pool() {
        let pool = Pool::new(16, 64);
        let out = pool.append(b"12345678".to_vec(), &[b"9abcdefgh"]);
        assert_eq!(out, b"123456789abcdefgh");
        assert_eq!(out.capacity(), 32);
    }

    #[test]
    fn test_append_returns_replaced_buffer_to_pool() {
        let pool = Pool::new(16, 64);
        let dst = pool.append(Vec::new(), &[b"0123456789"]);
        assert_eq!(dst.capacity(), 16);

        let out = pool.append(dst, &[b"abcdefghij"]);
        assert_eq!(out.capacity(), 32);
        assert_eq!(pool.idle(16), 1);
    }

    #[test]
    fn test_append_beyond_largest_class() {
        let pool = Pool::new(16, 64);
        let out = pool.append(vec![1u8; 60], &[&[2u8; 10]]);
        assert_eq!(out.len(), 70);
        assert_eq!(out.capacity(), 128);
        assert_eq!(&out[60..], &[2u8; 10]);
    }

    #[test]
    fn test_append_beyond_largest_class_exact_power_of_two() {
        let pool = Pool::new(16, 64);
        let out = pool.append(vec![1u8; 60], &[&[2u8; 68]]);
        assert_eq!(out.len(), 128);
        assert_eq!(out.capacity(), 128);
    }

    #[test]
    fn test_append_bytes() {
        let cases: [(Vec<u8>, &[u8], &[u8]); 6] = [
            (Vec::new(), &[], &[]),
            (Vec::new(), b"123", b"123"),
            (Vec::with_capacity(0), b"123", b"123"),
            (b"123".to_vec(), &[], b"123"),
            (b"123".to_vec(), b"45", b"12345"),
            (with_capacity(16, b"123"), b"45", b"12345"),
        ];
        for (i, (dst, bytes, expected)) in cases.into_iter().enumerate() {
            assert_eq!(append_bytes(dst, bytes.iter().copied()), expected, "case {i}");
        }
    }

    #[test]
    fn test_append_bytes_array() {
        let pool = Pool::new(4, 8);
        let out = pool.append_bytes(vec![1, 2, 3], [4, 5]);
        assert_eq!(out, [1, 2, 3, 4, 5]);
        assert_eq!(out.capacity(), 8);
    }
}
