//! Time-to-live response cache.
//!
//! Entries are appended with their insertion time and scanned linearly. A
//! lookup only hits while `now - inserted_at < ttl`. Once the cache is full,
//! further inserts are refused; expired entries keep their slots unless
//! `reclaim_expired` is set, so a long-running process eventually stops
//! caching new keys.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

use crate::cache::ResponseCache;
use crate::config::CachePolicy;

#[derive(Debug)]
struct TtlEntry {
    key: Box<[u8]>,
    value: Arc<[u8]>,
    inserted_at: Instant,
}

/// Fixed-capacity cache whose entries expire after `ttl`.
#[derive(Debug)]
pub struct TtlCache {
    capacity: usize,
    ttl: Duration,
    reclaim_expired: bool,
    entries: Mutex<Vec<TtlEntry>>,
}

impl TtlCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            ttl,
            reclaim_expired: false,
            entries: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    /// Allow a full cache to overwrite an expired entry instead of refusing.
    pub fn reclaim_expired(mut self, enabled: bool) -> Self {
        self.reclaim_expired = enabled;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn entries(&self) -> MutexGuard<'_, Vec<TtlEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_fresh(&self, entry: &TtlEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.inserted_at) < self.ttl
    }
}

impl ResponseCache for TtlCache {
    fn lookup(&self, key: &[u8]) -> Option<Arc<[u8]>> {
        let now = Instant::now();
        self.entries()
            .iter()
            .find(|e| &*e.key == key && self.is_fresh(e, now))
            .map(|e| e.value.clone())
    }

    fn insert(&self, key: &[u8], value: &[u8]) -> bool {
        let now = Instant::now();
        let entry = TtlEntry {
            key: key.into(),
            value: value.into(),
            inserted_at: now,
        };

        let mut entries = self.entries();
        if entries.len() < self.capacity {
            entries.push(entry);
            return true;
        }

        if self.reclaim_expired {
            if let Some(slot) = entries.iter_mut().find(|e| !self.is_fresh(e, now)) {
                *slot = entry;
                return true;
            }
        }

        tracing::debug!(capacity = self.capacity, "TTL cache full, entry not stored");
        false
    }

    fn len(&self) -> usize {
        self.entries().len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn policy(&self) -> CachePolicy {
        CachePolicy::Ttl
    }
}
