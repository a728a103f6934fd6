//! Bounded pool of reusable byte buffers for reading response bodies.

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard};

use log::warn;

/// Default number of idle buffers kept by a pool.
const DEFAULT_MAX_IDLE: usize = 16;

/// Buffers that grew beyond this are dropped instead of pooled.
const MAX_RETAINED_CAPACITY: usize = 256 * 1024;

/// Thread-safe pool of byte buffers scoped to one integration.
///
/// At most `max_idle` buffers are kept between uses; buffers are cleared
/// before being handed out again.
#[derive(Debug)]
pub struct BufferPool {
    idle: Mutex<Vec<Vec<u8>>>,
    max_idle: usize,
}

impl BufferPool {
    pub fn new() -> Self {
        Self::with_max_idle(DEFAULT_MAX_IDLE)
    }

    pub fn with_max_idle(max_idle: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::with_capacity(max_idle)),
            max_idle,
        }
    }

    fn lock_idle(&self) -> MutexGuard<'_, Vec<Vec<u8>>> {
        self.idle.lock().unwrap_or_else(|poisoned| {
            warn!("Buffer pool mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Borrow an empty buffer; it returns to the pool when dropped.
    pub fn get(&self) -> PooledBuffer<'_> {
        let buf = self.lock_idle().pop().unwrap_or_default();
        PooledBuffer {
            pool: self,
            buf: Some(buf),
        }
    }

    /// Number of idle buffers currently held.
    pub fn idle_count(&self) -> usize {
        self.lock_idle().len()
    }

    fn put(&self, mut buf: Vec<u8>) {
        if buf.capacity() > MAX_RETAINED_CAPACITY {
            return;
        }
        buf.clear();
        let mut idle = self.lock_idle();
        if idle.len() < self.max_idle {
            idle.push(buf);
        }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

/// A buffer on loan from a [`BufferPool`].
pub struct PooledBuffer<'a> {
    pool: &'a BufferPool,
    buf: Option<Vec<u8>>,
}

impl Deref for PooledBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        self.buf.as_ref().unwrap_or_else(|| unreachable!())
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.buf.as_mut().unwrap_or_else(|| unreachable!())
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        if let Some(buf) = self.buf.take() {
            self.pool.put(buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_returns_to_pool_cleared() {
        let pool = BufferPool::new();
        {
            let mut buf = pool.get();
            buf.extend_from_slice(b"{\"bitcoin\":{}}");
        }
        assert_eq!(pool.idle_count(), 1);

        let buf = pool.get();
        assert!(buf.is_empty());
        assert!(buf.capacity() >= 14);
    }

    #[test]
    fn test_pool_is_bounded() {
        let pool = BufferPool::with_max_idle(2);
        {
            let _a = pool.get();
            let _b = pool.get();
            let _c = pool.get();
        }
        assert_eq!(pool.idle_count(), 2);
    }

    #[test]
    fn test_oversized_buffers_are_not_retained() {
        let pool = BufferPool::new();
        {
            let mut buf = pool.get();
            buf.reserve(MAX_RETAINED_CAPACITY + 1);
        }
        assert_eq!(pool.idle_count(), 0);
    }
}
