//! The chunked buffer: one logical byte stream over pooled chunks.

use std::collections::VecDeque;
use std::fmt;

use bytes::Bytes;
use tracing::{debug, trace};

use crate::pool::Pool;

/// A growable FIFO byte buffer made of chunks borrowed from a [`Pool`].
///
/// Writes append to the last chunk and pull a new one from the pool when it
/// fills up; reads consume from the first chunk and hand it back to the pool
/// as soon as it is drained. Unlike a single `Vec<u8>`, growing never copies
/// what is already buffered.
///
/// A `ChunkedBuffer` is meant for a single owner. The pool behind it may be
/// shared by any number of buffers across threads.
///
/// # Example
///
/// ```
/// use std::io::{Read, Write};
/// use chunked::{ChunkedBuffer, Pool};
///
/// let pool = Pool::new(8, 16);
/// let mut buf = ChunkedBuffer::with_pool(&pool);
///
/// buf.write_all(b"abcdefghijklmnopqrstuvwxyz")?;
/// assert_eq!(buf.len(), 26);
///
/// let mut head = [0u8; 4];
/// buf.read_exact(&mut head)?;
/// assert_eq!(&head, b"abcd");
/// assert_eq!(buf.peek_byte(), b'e');
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct ChunkedBuffer<'p> {
    pool: &'p Pool,
    chunks: VecDeque<Vec<u8>>,
    /// Read cursor into the first chunk.
    offset: usize,
    length: usize,
    capacity: usize,
}

impl ChunkedBuffer<'static> {
    /// Creates an empty buffer backed by the process-wide default pool.
    pub fn new() -> Self {
        Self::with_pool(Pool::global())
    }
}

impl Default for ChunkedBuffer<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'p> ChunkedBuffer<'p> {
    /// Creates an empty buffer backed by `pool`.
    ///
    /// No chunk is taken from the pool until the first write.
    pub fn with_pool(pool: &'p Pool) -> Self {
        Self {
            pool,
            chunks: VecDeque::new(),
            offset: 0,
            length: 0,
            capacity: 0,
        }
    }

    /// Returns the pool chunks are taken from.
    pub fn pool(&self) -> &'p Pool {
        self.pool
    }

    /// Returns the number of unread bytes.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if there is nothing left to read.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the combined capacity of all chunks currently held.
    pub fn cap(&self) -> usize {
        self.capacity
    }

    /// Appends `data`, pulling chunks from the pool as needed.
    ///
    /// Each new chunk is requested at the size still left to write, so one
    /// large write takes one large chunk rather than many small ones.
    /// Always writes everything and returns `data.len()`.
    pub fn extend_from_slice(&mut self, data: &[u8]) -> usize {
        let mut rest = data;
        while !rest.is_empty() {
            let chunk = self.writable(rest.len());
            let n = (chunk.capacity() - chunk.len()).min(rest.len());
            let (head, tail) = rest.split_at(n);
            chunk.extend_from_slice(head);
            rest = tail;
        }
        self.length += data.len();
        data.len()
    }

    /// Appends a single byte, pulling a smallest-class chunk if needed.
    pub fn write_byte(&mut self, byte: u8) {
        self.writable(1).push(byte);
        self.length += 1;
    }

    /// Removes and returns the next unread byte, or `None` at end of stream.
    pub fn read_byte(&mut self) -> Option<u8> {
        let byte = *self.chunks.front()?.get(self.offset)?;
        self.consume(1);
        Some(byte)
    }

    /// Returns the next unread byte without consuming it, or `0` if empty.
    pub fn peek_byte(&self) -> u8 {
        self.chunks
            .front()
            .and_then(|chunk| chunk.get(self.offset))
            .copied()
            .unwrap_or(0)
    }

    /// Returns the most recently written byte, or `0` if empty.
    pub fn last_byte(&self) -> u8 {
        self.chunks
            .back()
            .and_then(|chunk| chunk.last())
            .copied()
            .unwrap_or(0)
    }

    /// Copies all unread bytes into one contiguous buffer without consuming
    /// them.
    ///
    /// The result comes from the pool when it fits the largest class, so it
    /// can be handed back with [`Pool::put`]. Larger contents get a
    /// power-of-two buffer allocated outside the pool. An empty buffer
    /// yields an empty `Vec` without allocating.
    pub fn contiguous(&self) -> Vec<u8> {
        if self.length == 0 {
            return Vec::new();
        }
        let mut out = if self.length > self.pool.largest() {
            debug!(
                len = self.length,
                largest = self.pool.largest(),
                "contents exceed largest size class, allocating outside the pool"
            );
            Vec::with_capacity(self.length.next_power_of_two())
        } else {
            self.pool.get(self.length)
        };
        for slice in self.slices() {
            out.extend_from_slice(slice);
        }
        out
    }

    /// Copies all unread bytes into an immutable [`Bytes`].
    pub fn to_bytes(&self) -> Bytes {
        Bytes::from(self.contiguous())
    }

    /// Returns every chunk to the pool and empties the buffer.
    pub fn reset(&mut self) {
        while let Some(chunk) = self.chunks.pop_front() {
            self.release(chunk);
        }
        self.offset = 0;
        self.length = 0;
        self.capacity = 0;
    }

    /// Unread bytes, one slice per chunk, front to back.
    pub(crate) fn slices(&self) -> impl Iterator<Item = &[u8]> {
        let offset = self.offset;
        self.chunks
            .iter()
            .enumerate()
            .map(move |(i, chunk)| if i == 0 { &chunk[offset..] } else { &chunk[..] })
    }

    /// Unread bytes of the first chunk.
    pub(crate) fn front(&self) -> &[u8] {
        self.chunks
            .front()
            .map_or(&[][..], |chunk| &chunk[self.offset..])
    }

    /// Returns the last chunk if it has room, otherwise a new chunk serving
    /// `hint` bytes.
    fn writable(&mut self, hint: usize) -> &mut Vec<u8> {
        let has_room = matches!(self.chunks.back(), Some(c) if c.len() < c.capacity());
        if !has_room {
            let chunk = self.pool.get(hint);
            trace!(hint, size = chunk.capacity(), "growing chunked buffer");
            self.capacity += chunk.capacity();
            self.chunks.push_back(chunk);
        }
        let last = self.chunks.len() - 1;
        &mut self.chunks[last]
    }

    /// Records `n` bytes appended to the last chunk behind the buffer's back.
    fn grew(&mut self, n: usize) {
        self.length += n;
    }

    /// Drops a trailing chunk left empty by an aborted fill.
    fn trim_back(&mut self) {
        if self.chunks.back().is_some_and(Vec::is_empty) {
            if let Some(chunk) = self.chunks.pop_back() {
                self.capacity -= chunk.capacity();
                self.release(chunk);
            }
        }
    }

    /// Advances the read cursor by `n` bytes, returning drained chunks to
    /// the pool.
    pub(crate) fn consume(&mut self, mut n: usize) {
        debug_assert!(n <= self.length);
        self.length -= n;
        while n > 0 {
            let Some(front) = self.chunks.front() else {
                break;
            };
            let unread = front.len() - self.offset;
            if n < unread {
                self.offset += n;
                return;
            }
            n -= unread;
            self.pop_front();
        }
    }

    /// Copies up to `dst.len()` bytes out of the buffer, consuming them.
    pub(crate) fn copy_out(&mut self, dst: &mut [u8]) -> usize {
        let mut n = 0;
        while n < dst.len() {
            let src = self.front();
            if src.is_empty() {
                break;
            }
            let a = src.len().min(dst.len() - n);
            dst[n..n + a].copy_from_slice(&src[..a]);
            n += a;
            self.consume(a);
        }
        n
    }

    fn pop_front(&mut self) {
        if let Some(chunk) = self.chunks.pop_front() {
            self.capacity -= chunk.capacity();
            self.release(chunk);
        }
        self.offset = 0;
    }

    fn release(&self, chunk: Vec<u8>) {
        // Chunks only ever come from this pool and never grow, so they
        // always match a class.
        let _ = self.pool.put(chunk);
    }
}

/// Fill cursor over the back of a [`ChunkedBuffer`] for bulk reads.
///
/// The chunk being filled is zeroed out to its capacity once, when it
/// becomes the target, and handed out piecewise through [`Filler::spare`].
/// Its length is brought back in line with the bytes actually filled when
/// it is full, or when the `Filler` is dropped, which also releases a chunk
/// that received nothing. Dropping mid-fill therefore leaves the buffer
/// consistent.
pub(crate) struct Filler<'a, 'p> {
    buf: &'a mut ChunkedBuffer<'p>,
    hint: usize,
    /// Bytes of the target chunk holding data.
    filled: usize,
    /// Capacity of the target chunk while one is open.
    end: Option<usize>,
}

impl<'a, 'p> Filler<'a, 'p> {
    /// Starts filling `buf`, pulling new chunks at `hint` bytes.
    pub(crate) fn new(buf: &'a mut ChunkedBuffer<'p>, hint: usize) -> Self {
        Self {
            buf,
            hint,
            filled: 0,
            end: None,
        }
    }

    /// Returns the unfilled, zeroed tail of the target chunk, opening one if
    /// there is none.
    pub(crate) fn spare(&mut self) -> &mut [u8] {
        if self.end.is_none() {
            let chunk = self.buf.writable(self.hint);
            let end = chunk.capacity();
            self.filled = chunk.len();
            self.end = Some(end);
            chunk.resize(end, 0);
            return &mut chunk[self.filled..];
        }
        match self.buf.chunks.back_mut() {
            Some(chunk) => &mut chunk[self.filled..],
            None => &mut [],
        }
    }

    /// Records `n` bytes written into the slice from [`Filler::spare`].
    pub(crate) fn advance(&mut self, n: usize) {
        debug_assert!(self.end.is_some_and(|end| self.filled + n <= end));
        self.filled += n;
        self.buf.grew(n);
        if self.end == Some(self.filled) {
            self.close();
        }
    }

    fn close(&mut self) {
        if self.end.take().is_none() {
            return;
        }
        if let Some(chunk) = self.buf.chunks.back_mut() {
            chunk.truncate(self.filled);
        }
    }
}

impl Drop for Filler<'_, '_> {
    fn drop(&mut self) {
        self.close();
        self.buf.trim_back();
    }
}

impl Drop for ChunkedBuffer<'_> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl fmt::Debug for ChunkedBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkedBuffer")
            .field("len", &self.length)
            .field("cap", &self.capacity)
            .field("chunks", &self.chunks.len())
            .field("offset", &self.offset)
            .finish()
    }
}
