//! Bounded price history feeding the trend sparkline.

use std::collections::VecDeque;

use crate::constants::{MAX_HISTORY_LEN, MIN_HISTORY_LEN};

/// FIFO buffer of the most recent prices.
///
/// The first push fills the whole buffer with copies of the value, so the
/// sparkline starts as a flat line rather than a single point.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    capacity: usize,
    values: VecDeque<f64>,
}

impl History {
    /// Create an empty history. `capacity` is clamped to the supported range.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = clamp_capacity(capacity);
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        }
    }

    /// Number of points to keep for a sparkline `width` cells wide with one
    /// point every `spacing` cells.
    #[must_use]
    pub fn capacity_for_width(width: usize, spacing: usize) -> usize {
        clamp_capacity(width / spacing.max(1))
    }

    /// Append a value, evicting the oldest when full.
    ///
    /// Non-finite values are ignored.
    pub fn push(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        if self.values.is_empty() {
            self.values.resize(self.capacity, value);
            return;
        }
        self.values.push_back(value);
        while self.values.len() > self.capacity {
            self.values.pop_front();
        }
    }

    /// Change the capacity, keeping the newest values.
    ///
    /// Growing pads the front with the oldest value.
    pub fn resize(&mut self, capacity: usize) {
        let capacity = clamp_capacity(capacity);
        self.capacity = capacity;
        while self.values.len() > capacity {
            self.values.pop_front();
        }
        if let Some(&oldest) = self.values.front() {
            while self.values.len() < capacity {
                self.values.push_front(oldest);
            }
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Most recent value.
    #[must_use]
    pub fn latest(&self) -> Option<f64> {
        self.values.back().copied()
    }

    /// Values from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(MIN_HISTORY_LEN)
    }
}

fn clamp_capacity(capacity: usize) -> usize {
    capacity.clamp(MIN_HISTORY_LEN, MAX_HISTORY_LEN)
}
