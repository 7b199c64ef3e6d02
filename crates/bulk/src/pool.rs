//! Lock-free pool of bulk body buffers
//!
//! Batch builders churn through large byte buffers; pooling them keeps the
//! allocator out of the hot path. Buffers move by ownership transfer: `get`
//! hands out an exclusively owned buffer, `put` takes it back once the
//! request bytes have been handed to the transport.
//!
//! # Example
//!
//! ```ignore
//! let pool = BufferPool::new(8, 256 * 1024);
//!
//! let buf = pool.get();
//! let mut encoder = BulkEncoder::from_config_with_buffer(&config, buf)?;
//! // ... add records, send the body ...
//! pool.put(encoder.into_buffer());
//! ```

use crossbeam::queue::ArrayQueue;
use std::sync::atomic::{AtomicU64, Ordering};

/// Buffers whose capacity grew past this multiple of the target are
/// dropped instead of pooled
pub const MAX_RETAIN_FACTOR: usize = 4;

/// Lock-free pool of reusable `Vec<u8>` body buffers
///
/// Pre-allocates buffers at construction time. When the pool is exhausted,
/// new buffers are allocated on demand and can be returned later.
pub struct BufferPool {
    /// Lock-free queue of available buffers
    queue: ArrayQueue<Vec<u8>>,

    /// Target capacity for each buffer
    buffer_capacity: usize,

    /// Metrics
    metrics: BufferPoolMetrics,
}

/// Metrics for buffer pool monitoring
#[derive(Debug, Default)]
pub struct BufferPoolMetrics {
    /// Number of successful pool hits (buffer reused)
    pub hits: AtomicU64,

    /// Number of pool misses (new allocation required)
    pub misses: AtomicU64,

    /// Number of buffers returned to the pool
    pub returns: AtomicU64,

    /// Number of buffers dropped (pool full or capacity out of bounds)
    pub drops: AtomicU64,
}

impl BufferPoolMetrics {
    /// Create new metrics instance
    pub const fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            returns: AtomicU64::new(0),
            drops: AtomicU64::new(0),
        }
    }

    /// Record a pool hit
    #[inline]
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a pool miss
    #[inline]
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a buffer return
    #[inline]
    pub fn record_return(&self) {
        self.returns.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a buffer drop
    #[inline]
    pub fn record_drop(&self) {
        self.drops.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            returns: self.returns.load(Ordering::Relaxed),
            drops: self.drops.load(Ordering::Relaxed),
        }
    }

    /// Calculate hit rate (0.0 to 1.0)
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            1.0
        } else {
            hits as f64 / total as f64
        }
    }
}

/// Point-in-time snapshot of buffer pool metrics
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub returns: u64,
    pub drops: u64,
}

impl MetricsSnapshot {
    /// Calculate hit rate from snapshot
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            1.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl BufferPool {
    /// Create a new buffer pool with pre-allocated buffers
    ///
    /// # Arguments
    ///
    /// * `pool_size` - Number of buffers to pre-allocate
    /// * `buffer_capacity` - Target capacity of each buffer in bytes
    pub fn new(pool_size: usize, buffer_capacity: usize) -> Self {
        let queue = ArrayQueue::new(pool_size);

        // Pre-allocate all buffers
        for _ in 0..pool_size {
            let buf = Vec::with_capacity(buffer_capacity);
            // Always succeeds while filling an empty queue
            let _ = queue.push(buf);
        }

        Self {
            queue,
            buffer_capacity,
            metrics: BufferPoolMetrics::new(),
        }
    }

    /// Get a buffer from the pool
    ///
    /// Returns a pooled buffer if available, otherwise allocates a new one.
    /// The buffer is always empty; only capacity is recycled.
    #[inline]
    pub fn get(&self) -> Vec<u8> {
        match self.queue.pop() {
            Some(buf) => {
                self.metrics.record_hit();
                buf
            }
            None => {
                self.metrics.record_miss();
                Vec::with_capacity(self.buffer_capacity)
            }
        }
    }

    /// Return a buffer to the pool
    ///
    /// Clears the buffer and pools it if its capacity is still within
    /// bounds: at least the target, at most [`MAX_RETAIN_FACTOR`] times it.
    /// Shrunken or ballooned buffers are dropped, as is anything returned
    /// while the pool is full.
    #[inline]
    pub fn put(&self, mut buf: Vec<u8>) {
        buf.clear();

        let capacity = buf.capacity();
        if capacity < self.buffer_capacity || capacity > self.buffer_capacity * MAX_RETAIN_FACTOR {
            self.metrics.record_drop();
            return;
        }

        match self.queue.push(buf) {
            Ok(()) => self.metrics.record_return(),
            Err(_) => self.metrics.record_drop(),
        }
    }

    /// Get the number of buffers currently available in the pool
    #[inline]
    pub fn available(&self) -> usize {
        self.queue.len()
    }

    /// Get the pool capacity (maximum number of buffers)
    #[inline]
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Get the target buffer capacity
    #[inline]
    pub fn buffer_capacity(&self) -> usize {
        self.buffer_capacity
    }

    /// Get reference to metrics
    #[inline]
    pub fn metrics(&self) -> &BufferPoolMetrics {
        &self.metrics
    }

    /// Check if the pool is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Check if the pool is full
    #[inline]
    pub fn is_full(&self) -> bool {
        self.queue.is_full()
    }
}

#[cfg(test)]
#[path = "pool_test.rs"]
mod pool_test;
