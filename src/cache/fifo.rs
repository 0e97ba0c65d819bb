//! FIFO Tracker Module
//!
//! Tracks insertion order for eviction. Reads never touch this order.

use std::collections::BTreeMap;

// == Insertion Order ==
/// Keys ordered by insertion sequence number.
///
/// Every insert takes a fresh, strictly increasing sequence number, so the
/// first element of the map is always the oldest insertion. Removal by
/// sequence number is `O(log n)`.
#[derive(Debug, Default)]
pub struct InsertionOrder {
    order: BTreeMap<u64, String>,
    next_seq: u64,
}

impl InsertionOrder {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Push ==
    /// Records `key` as the newest insertion and returns its sequence number.
    pub fn push(&mut self, key: &str) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert(seq, key.to_string());
        seq
    }

    // == Remove ==
    /// Forgets the insertion recorded under `seq`.
    pub fn remove(&mut self, seq: u64) -> Option<String> {
        self.order.remove(&seq)
    }

    // == Pop Oldest ==
    /// Returns and removes the oldest-inserted key.
    pub fn pop_oldest(&mut self) -> Option<String> {
        self.order.pop_first().map(|(_, key)| key)
    }

    // == Peek Oldest ==
    /// Returns the oldest-inserted key without removing it.
    pub fn peek_oldest(&self) -> Option<&str> {
        self.order.values().next().map(String::as_str)
    }

    /// Keys from oldest to newest.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.values().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
