//! Naive fixed-slot response cache.
//!
//! Appends until full, then always overwrites slot 0. No recency or age is
//! tracked; lookups return the first exact key match.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::cache::ResponseCache;
use crate::config::CachePolicy;

#[derive(Debug)]
pub struct NaiveCache {
    capacity: usize,
    entries: Mutex<Vec<(Box<[u8]>, Arc<[u8]>)>>,
}

impl NaiveCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    fn entries(&self) -> MutexGuard<'_, Vec<(Box<[u8]>, Arc<[u8]>)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ResponseCache for NaiveCache {
    fn lookup(&self, key: &[u8]) -> Option<Arc<[u8]>> {
        self.entries()
            .iter()
            .find(|(k, _)| &**k == key)
            .map(|(_, v)| v.clone())
    }

    fn insert(&self, key: &[u8], value: &[u8]) -> bool {
        let entry = (Box::from(key), Arc::from(value));
        let mut entries = self.entries();
        if entries.len() < self.capacity {
            entries.push(entry);
        } else {
            entries[0] = entry;
        }
        true
    }

    fn len(&self) -> usize {
        self.entries().len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn policy(&self) -> CachePolicy {
        CachePolicy::Naive
    }
}
