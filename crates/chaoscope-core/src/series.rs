//! Bounded FIFO ring buffers for observed numeric series.
//!
//! One buffer per metric (response times, sample counts, entropy stream,
//! mixed values). Capacity is a hard bound with strict oldest-first
//! eviction. This is the system's only backpressure mechanism: an unbounded
//! producer can never cause unbounded growth.

use std::collections::VecDeque;

/// Default per-series capacity.
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Fixed-capacity FIFO buffer of `f64` observations.
#[derive(Debug, Clone)]
pub struct SeriesBuffer {
    capacity: usize,
    data: VecDeque<f64>,
}

impl SeriesBuffer {
    /// Create a buffer with the given capacity. A zero capacity is clamped
    /// to one; an unwritable buffer is a configuration error, not a state.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            data: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append one observation, evicting the oldest if at capacity.
    pub fn push(&mut self, value: f64) {
        if self.data.len() == self.capacity {
            self.data.pop_front();
        }
        self.data.push_back(value);
    }

    /// Append many observations in order.
    pub fn extend(&mut self, values: impl IntoIterator<Item = f64>) {
        for v in values {
            self.push(v);
        }
    }

    /// Copy out the full contents in insertion order.
    pub fn snapshot(&self) -> Vec<f64> {
        self.data.iter().copied().collect()
    }

    /// Copy out the most recent `n` observations in insertion order.
    pub fn recent(&self, n: usize) -> Vec<f64> {
        let skip = self.data.len().saturating_sub(n);
        self.data.iter().skip(skip).copied().collect()
    }

    /// Drop every observation, keeping the capacity.
    pub fn clear(&mut self) {
        self.data.clear();
    }
}

impl Default for SeriesBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
