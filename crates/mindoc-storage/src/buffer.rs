//! Pooled part buffers for multipart uploads.
//!
//! Each upload rents one part-sized buffer for the lifetime of its session
//! instead of allocating per request. `PooledBuffer` hands the allocation
//! back on drop, so the buffer is released on every exit path, aborts and
//! cancellations included.

use bytes::BytesMut;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex};

/// Upper bound on idle buffers the pool retains.
const MAX_POOLED_BUFFERS: usize = 8;

/// Pool of part-sized byte buffers shared by concurrent uploads.
pub struct BufferPool {
    capacity: usize,
    idle: Mutex<Vec<BytesMut>>,
}

impl BufferPool {
    /// Create a pool handing out buffers of `capacity` bytes.
    pub fn new(capacity: usize) -> Arc<Self> {
        Arc::new(BufferPool {
            capacity,
            idle: Mutex::new(Vec::new()),
        })
    }

    /// Buffer capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Rent an empty buffer, reusing an idle one when available.
    pub fn checkout(self: &Arc<Self>) -> PooledBuffer {
        let reused = self.idle.lock().ok().and_then(|mut idle| idle.pop());
        let buf = reused.unwrap_or_else(|| BytesMut::with_capacity(self.capacity));
        PooledBuffer {
            buf,
            pool: Arc::clone(self),
        }
    }

    fn check_in(&self, mut buf: BytesMut) {
        buf.clear();
        // Buffers that lost capacity (e.g. after a split) are dropped and
        // replaced by a fresh allocation on the next checkout.
        if buf.capacity() < self.capacity {
            return;
        }
        if let Ok(mut idle) = self.idle.lock() {
            if idle.len() < MAX_POOLED_BUFFERS {
                idle.push(buf);
            }
        }
    }

    #[cfg(test)]
    fn idle_len(&self) -> usize {
        self.idle.lock().map(|idle| idle.len()).unwrap_or(0)
    }
}

/// A buffer rented from a `BufferPool`, returned to the pool on drop.
pub struct PooledBuffer {
    buf: BytesMut,
    pool: Arc<BufferPool>,
}

impl Deref for PooledBuffer {
    type Target = BytesMut;

    fn deref(&self) -> &BytesMut {
        &self.buf
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut BytesMut {
        &mut self.buf
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        let buf = std::mem::take(&mut self.buf);
        self.pool.check_in(buf);
    }
}
