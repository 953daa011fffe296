//! Bounded tail buffer for check output
//!
//! Keeps only the most recent bytes written, so a check that prints gigabytes
//! costs at most the configured ceiling in memory.

use std::collections::VecDeque;
use std::fmt;

/// Default ceiling for captured output per check.
pub const DEFAULT_CAPTURE_BYTES: usize = 128 * 1024;

/// A byte buffer that drops its oldest contents once `max_bytes` is reached
#[derive(Debug, Clone)]
pub struct RingBuffer {
    buffer: VecDeque<u8>,
    max_bytes: usize,
    total_bytes_written: usize,
}

impl Default for RingBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPTURE_BYTES)
    }
}

impl RingBuffer {
    /// Create a new ring buffer with the specified maximum size
    #[must_use]
    pub fn new(max_bytes: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(max_bytes.min(8192)),
            max_bytes,
            total_bytes_written: 0,
        }
    }

    /// Append `data`, evicting from the front to stay within the ceiling.
    pub fn write(&mut self, data: &[u8]) {
        self.total_bytes_written += data.len();
        if self.max_bytes == 0 {
            return;
        }

        if data.len() >= self.max_bytes {
            self.buffer.clear();
            self.buffer.extend(&data[data.len() - self.max_bytes..]);
            return;
        }

        let overflow = (self.buffer.len() + data.len()).saturating_sub(self.max_bytes);
        self.buffer.drain(..overflow);
        self.buffer.extend(data);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.max_bytes
    }

    /// Get the total number of bytes written (including evicted bytes)
    #[must_use]
    pub const fn total_bytes_written(&self) -> usize {
        self.total_bytes_written
    }

    /// Check if any data was evicted
    #[must_use]
    pub const fn was_truncated(&self) -> bool {
        self.total_bytes_written > self.max_bytes
    }

    /// Copy out the retained bytes, oldest first.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.buffer.iter().copied().collect()
    }
}

impl fmt::Display for RingBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.to_bytes()))
    }
}
