//! Strict LRU response cache.
//!
//! Entries live in a slot arena addressed by index. Recency is an intrusive
//! doubly-linked list threaded through the slots (head = most recently used,
//! tail = least recently used), and freed slots are recycled through a free
//! list, so the arena never grows past `capacity`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::cache::ResponseCache;
use crate::config::CachePolicy;

type SlotIdx = usize;

#[derive(Debug)]
struct Slot {
    key: Arc<[u8]>,
    value: Arc<[u8]>,
    prev: Option<SlotIdx>,
    next: Option<SlotIdx>,
}

#[derive(Debug, Default)]
struct LruState {
    slots: Vec<Option<Slot>>,
    free: Vec<SlotIdx>,
    index: HashMap<Arc<[u8]>, SlotIdx>,
    head: Option<SlotIdx>,
    tail: Option<SlotIdx>,
}

impl LruState {
    fn slot(&self, idx: SlotIdx) -> &Slot {
        self.slots[idx].as_ref().expect("linked slot is occupied")
    }

    fn slot_mut(&mut self, idx: SlotIdx) -> &mut Slot {
        self.slots[idx].as_mut().expect("linked slot is occupied")
    }

    fn alloc(&mut self, key: Arc<[u8]>, value: Arc<[u8]>) -> SlotIdx {
        let slot = Slot {
            key,
            value,
            prev: None,
            next: None,
        };
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(slot);
                idx
            }
            None => {
                self.slots.push(Some(slot));
                self.slots.len() - 1
            }
        }
    }

    /// Detach `idx` from the recency list, leaving its slot occupied.
    fn unlink(&mut self, idx: SlotIdx) {
        let (prev, next) = {
            let slot = self.slot(idx);
            (slot.prev, slot.next)
        };

        match prev {
            Some(p) => self.slot_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slot_mut(n).prev = prev,
            None => self.tail = prev,
        }

        let slot = self.slot_mut(idx);
        slot.prev = None;
        slot.next = None;
    }

    fn push_front(&mut self, idx: SlotIdx) {
        let old_head = self.head;
        {
            let slot = self.slot_mut(idx);
            slot.prev = None;
            slot.next = old_head;
        }
        match old_head {
            Some(h) => self.slot_mut(h).prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    fn promote(&mut self, idx: SlotIdx) {
        if self.head != Some(idx) {
            self.unlink(idx);
            self.push_front(idx);
        }
    }

    fn evict_tail(&mut self) -> Option<Arc<[u8]>> {
        let idx = self.tail?;
        self.unlink(idx);
        let slot = self.slots[idx].take()?;
        self.free.push(idx);
        self.index.remove(&slot.key);
        Some(slot.key)
    }
}

/// LRU cache with a fixed entry capacity.
#[derive(Debug)]
pub struct LruCache {
    capacity: usize,
    state: Mutex<LruState>,
}

impl LruCache {
    /// Create a cache holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::new(LruState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, LruState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Keys from most to least recently used.
    pub fn keys_by_recency(&self) -> Vec<Vec<u8>> {
        let state = self.state();
        let mut keys = Vec::with_capacity(state.index.len());
        let mut cursor = state.head;
        while let Some(idx) = cursor {
            let slot = state.slot(idx);
            keys.push(slot.key.to_vec());
            cursor = slot.next;
        }
        keys
    }
}

impl ResponseCache for LruCache {
    fn lookup(&self, key: &[u8]) -> Option<Arc<[u8]>> {
        let mut state = self.state();
        let idx = *state.index.get(key)?;
        state.promote(idx);
        Some(state.slot(idx).value.clone())
    }

    fn insert(&self, key: &[u8], value: &[u8]) -> bool {
        let mut state = self.state();

        if let Some(&idx) = state.index.get(key) {
            state.slot_mut(idx).value = Arc::from(value);
            state.promote(idx);
            return true;
        }

        if state.index.len() >= self.capacity {
            if let Some(evicted) = state.evict_tail() {
                tracing::trace!(evicted_bytes = evicted.len(), "LRU entry evicted");
            }
        }

        let key: Arc<[u8]> = Arc::from(key);
        let idx = state.alloc(key.clone(), Arc::from(value));
        state.push_front(idx);
        state.index.insert(key, idx);
        true
    }

    fn len(&self) -> usize {
        self.state().index.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn policy(&self) -> CachePolicy {
        CachePolicy::Lru
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(cache: &LruCache) -> Vec<String> {
        cache
            .keys_by_recency()
            .into_iter()
            .map(|k| String::from_utf8(k).unwrap())
            .collect()
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = LruCache::new(3);
        cache.insert(b"a", b"1");
        cache.insert(b"b", b"2");
        cache.insert(b"c", b"3");
        cache.insert(b"d", b"4");

        assert_eq!(cache.len(), 3);
        assert!(cache.lookup(b"a").is_none());
        assert_eq!(&*cache.lookup(b"d").unwrap(), b"4");
    }

    #[test]
    fn hit_promotes_entry() {
        let cache = LruCache::new(3);
        cache.insert(b"a", b"1");
        cache.insert(b"b", b"2");
        cache.insert(b"c", b"3");

        // Touch the oldest entry; "b" becomes the eviction victim.
        assert!(cache.lookup(b"a").is_some());
        assert_eq!(keys(&cache), vec!["a", "c", "b"]);

        cache.insert(b"d", b"4");
        assert!(cache.lookup(b"b").is_none());
        assert!(cache.lookup(b"a").is_some());
        assert_eq!(keys(&cache), vec!["a", "d", "c"]);
    }

    #[test]
    fn reinsert_replaces_value_without_duplicating() {
        let cache = LruCache::new(2);
        cache.insert(b"a", b"old");
        cache.insert(b"b", b"2");
        cache.insert(b"a", b"new");

        assert_eq!(cache.len(), 2);
        assert_eq!(keys(&cache), vec!["a", "b"]);
        assert_eq!(&*cache.lookup(b"a").unwrap(), b"new");
    }

    #[test]
    fn slots_are_recycled() {
        let cache = LruCache::new(2);
        for i in 0..100u32 {
            cache.insert(&i.to_le_bytes(), b"v");
        }
        let state = cache.state();
        assert!(state.slots.len() <= 2);
        assert_eq!(state.index.len(), 2);
    }

    #[test]
    fn capacity_one() {
        let cache = LruCache::new(1);
        cache.insert(b"a", b"1");
        cache.insert(b"b", b"2");
        assert!(cache.lookup(b"a").is_none());
        assert_eq!(&*cache.lookup(b"b").unwrap(), b"2");
        assert_eq!(keys(&cache), vec!["b"]);
    }

    #[test]
    fn miss_on_empty_cache() {
        let cache = LruCache::new(4);
        assert!(cache.lookup(b"anything").is_none());
        assert!(cache.is_empty());
    }
}
