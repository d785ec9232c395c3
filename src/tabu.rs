//! Recency cache of recently accepted solutions.

use std::collections::VecDeque;

/// Bounded most-recent-first set of solution fingerprints.
///
/// The capacity moves between `min_capacity` and `max_capacity` while the
/// search runs; shrinking evicts the oldest entries immediately.
#[derive(Debug, Clone)]
pub struct TabuCache {
    entries: VecDeque<u64>,
    capacity: usize,
    min_capacity: usize,
    max_capacity: usize,
}

impl TabuCache {
    /// Create a cache starting at its maximum capacity.
    pub fn new(min_capacity: usize, max_capacity: usize) -> Self {
        let min_capacity = min_capacity.max(1);
        let max_capacity = max_capacity.max(min_capacity);
        TabuCache {
            entries: VecDeque::with_capacity(max_capacity),
            capacity: max_capacity,
            min_capacity,
            max_capacity,
        }
    }

    /// Size the cache for an iteration budget: at least `max(1, min_fraction * iterations)`
    /// and at most `max_fraction * iterations` entries.
    pub fn for_budget(iterations: usize, min_fraction: f64, max_fraction: f64) -> Self {
        let min = (iterations as f64 * min_fraction).floor() as usize;
        let max = (iterations as f64 * max_fraction).floor() as usize;
        TabuCache::new(min, max)
    }

    /// Insert a fingerprint as the most recent entry.
    ///
    /// A fingerprint already present is moved to the front instead of being
    /// duplicated; beyond capacity the oldest entry is evicted.
    pub fn push(&mut self, fingerprint: u64) {
        if let Some(pos) = self.entries.iter().position(|&f| f == fingerprint) {
            self.entries.remove(pos);
        }
        self.entries.push_front(fingerprint);
        self.entries.truncate(self.capacity);
    }

    pub fn contains(&self, fingerprint: u64) -> bool {
        self.entries.contains(&fingerprint)
    }

    /// Reduce the capacity by one, down to the minimum.
    pub fn shrink(&mut self) {
        self.capacity = self.capacity.saturating_sub(1).max(self.min_capacity);
        self.entries.truncate(self.capacity);
    }

    /// Increase the capacity by one, up to the maximum.
    pub fn grow(&mut self) {
        self.capacity = (self.capacity + 1).min(self.max_capacity);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.capacity = self.max_capacity;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn min_capacity(&self) -> usize {
        self.min_capacity
    }

    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    /// Fingerprints from most to least recent.
    pub fn iter(&self) -> impl Iterator<Item = &u64> {
        self.entries.iter()
    }
}
