use std::collections::{HashSet, VecDeque};

use station::DedupKey;

/// Window of the most recently seen keys. When full, the oldest key is
/// evicted. A capacity of `0` keeps every key for the process lifetime.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<DedupKey>,
    order: VecDeque<DedupKey>,
    capacity: usize,
}

impl Deduplicator {
    pub fn new(capacity: usize) -> Self {
        Self {
            seen: HashSet::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    /// Returns `false` when the key is already in the window.
    pub fn insert(&mut self, key: DedupKey) -> bool {
        if self.seen.contains(&key) {
            return false;
        }

        if self.capacity == 0 {
            self.seen.insert(key);
            return true;
        }

        if self.seen.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }

        self.seen.insert(key.clone());
        self.order.push_back(key);

        true
    }

    pub fn contains(&self, key: &DedupKey) -> bool {
        self.seen.contains(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.seen.len()
    }
}

impl Extend<DedupKey> for Deduplicator {
    fn extend<I: IntoIterator<Item = DedupKey>>(&mut self, keys: I) {
        for key in keys {
            self.insert(key);
        }
    }
}
