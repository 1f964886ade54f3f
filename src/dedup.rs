//! # Dedup Registry
//! Bounded recency window over announcement ids.
//!
//! Feeds republish the same entries on every poll, so every announcement is
//! checked here before a job is created. The window keeps the
//! most-recently-admitted `capacity` ids in admission order; an evicted id
//! seen again later is treated as new.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

/// Thread-safe insertion-ordered bounded id set.
///
/// A queue carries admission order (so eviction removes the oldest entries
/// first) and a set answers membership; an unordered set alone cannot
/// guarantee which ids survive eviction.
#[derive(Debug)]
pub struct DedupRegistry {
    inner: Mutex<Inner>,
    capacity: usize,
}

#[derive(Debug)]
struct Inner {
    order: VecDeque<String>,
    seen: HashSet<String>,
}

impl DedupRegistry {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                order: VecDeque::with_capacity(capacity),
                seen: HashSet::with_capacity(capacity),
            }),
            capacity: capacity.max(1),
        }
    }

    /// Check-and-admit as one atomic operation: returns `true` exactly once
    /// per id while the id stays inside the window. Admission may evict the
    /// oldest ids to hold the size at capacity.
    pub fn is_new(&self, id: &str) -> bool {
        let mut inner = self.inner.lock().expect("dedup mutex poisoned");
        if inner.seen.contains(id) {
            return false;
        }

        inner.seen.insert(id.to_string());
        inner.order.push_back(id.to_string());

        while inner.order.len() > self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.seen.remove(&oldest);
                tracing::trace!(id = %oldest, "evicted from dedup window");
            }
        }
        true
    }

    /// Ids currently inside the window.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("dedup mutex poisoned").order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_check_for_same_id_is_not_new() {
        let reg = DedupRegistry::with_capacity(10);
        assert!(reg.is_new("a"));
        assert!(!reg.is_new("a"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn eviction_removes_oldest_first() {
        let reg = DedupRegistry::with_capacity(3);
        for id in ["a", "b", "c", "d"] {
            assert!(reg.is_new(id));
        }
        assert_eq!(reg.len(), 3);
        // "a" was evicted; the most recent three survive.
        assert!(!reg.is_new("b"));
        assert!(!reg.is_new("c"));
        assert!(!reg.is_new("d"));
        // An evicted id re-seen is admissible again (and evicts "b" in turn).
        assert!(reg.is_new("a"));
        assert!(reg.is_new("b"));
    }
}
