// Buffer module - Reusable message buffers

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard};

/// Initial capacity of a message buffer and the step it grows by
pub const BUFFER_INCREMENT: usize = 4096;

/// A growable text buffer used to assemble one log message
///
/// The buffer enforces its own capacity limit: formatting past the limit
/// stores what fits and fails, the caller then calls [`MsgBuffer::grow`] and
/// formats again. A buffer never shrinks.
#[derive(Debug)]
pub struct MsgBuffer {
    /// Formatted message body
    body: String,
    /// Header scratch space, rebuilt for every message
    header: String,
    /// Current capacity limit for the body
    limit: usize,
    /// Set when a write did not fit within `limit`
    truncated: bool,
}

impl MsgBuffer {
    /// Create a buffer with the default capacity
    pub fn new() -> Self {
        Self {
            body: String::with_capacity(BUFFER_INCREMENT),
            header: String::new(),
            limit: BUFFER_INCREMENT,
            truncated: false,
        }
    }

    /// Placeholder that holds no allocation
    fn empty() -> Self {
        Self {
            body: String::new(),
            header: String::new(),
            limit: BUFFER_INCREMENT,
            truncated: false,
        }
    }

    /// Reset the write position to offset 0
    ///
    /// Capacity is kept, so a reused buffer never reallocates for messages
    /// that fit.
    pub fn clear(&mut self) {
        self.body.clear();
        self.header.clear();
        self.truncated = false;
    }

    /// Raise the capacity limit by one increment
    ///
    /// Returns false if the allocation failed; the buffer then keeps its
    /// previous limit and content.
    pub fn grow(&mut self) -> bool {
        let new_limit = self.limit + BUFFER_INCREMENT;
        let additional = new_limit.saturating_sub(self.body.len());
        if self.body.try_reserve(additional).is_err() {
            return false;
        }
        self.limit = new_limit;
        true
    }

    /// Format `args` into the body, growing as needed
    ///
    /// If growing fails the body holds the truncated prefix that fit.
    pub fn format(&mut self, args: fmt::Arguments<'_>) {
        loop {
            self.body.clear();
            self.truncated = false;
            if fmt::write(self, args).is_ok() {
                return;
            }
            if !self.truncated || !self.grow() {
                return;
            }
        }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Append a string to the body, ignoring the capacity limit
    pub fn push_str(&mut self, s: &str) {
        self.body.push_str(s);
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut String {
        &mut self.header
    }

    /// Split borrow of header and body for dispatch
    pub fn parts(&self) -> (&str, &str) {
        (&self.header, &self.body)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

impl Default for MsgBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Write for MsgBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.limit.saturating_sub(self.body.len());
        if s.len() <= room {
            self.body.push_str(s);
            return Ok(());
        }

        // Keep whatever fits on a char boundary
        let mut cut = room;
        while cut > 0 && !s.is_char_boundary(cut) {
            cut -= 1;
        }
        self.body.push_str(&s[..cut]);
        self.truncated = true;
        Err(fmt::Error)
    }
}

/// Pool of idle message buffers shared by every logger
///
/// The free list is the only shared structure guarded by the pool's lock.
#[derive(Debug, Default)]
pub struct BufferPool {
    idle: Mutex<Vec<MsgBuffer>>,
}

impl BufferPool {
    pub fn new() -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
        }
    }

    fn idle_list(&self) -> MutexGuard<'_, Vec<MsgBuffer>> {
        match self.idle.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Take a buffer out of the pool, allocating if none is idle
    ///
    /// The returned buffer keeps whatever content it held when released.
    pub fn acquire(&self) -> MsgBuffer {
        self.idle_list().pop().unwrap_or_default()
    }

    /// Return a buffer to the pool
    pub fn release(&self, buffer: MsgBuffer) {
        self.idle_list().push(buffer);
    }

    /// Check out a buffer that returns itself to the pool on drop
    pub fn checkout(&self) -> PooledBuffer<'_> {
        PooledBuffer {
            pool: self,
            buffer: self.acquire(),
        }
    }

    /// Number of idle buffers
    pub fn idle_count(&self) -> usize {
        self.idle_list().len()
    }
}

/// A buffer checked out of a [`BufferPool`]
///
/// Exactly one release happens, when the guard is dropped.
pub struct PooledBuffer<'a> {
    pool: &'a BufferPool,
    buffer: MsgBuffer,
}

impl Deref for PooledBuffer<'_> {
    type Target = MsgBuffer;

    fn deref(&self) -> &MsgBuffer {
        &self.buffer
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut MsgBuffer {
        &mut self.buffer
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        let buffer = std::mem::replace(&mut self.buffer, MsgBuffer::empty());
        self.pool.release(buffer);
    }
}
