//! Response cache subsystem.
//!
//! # Data Flow
//! ```text
//! Session has read the client request
//!     → proxy/fingerprint.rs derives the lookup key
//!     → ResponseCache::lookup
//!         hit  → reply from cache, no backend contact
//!         miss → relay from backend
//!               → ResponseCache::insert(fingerprint, response)
//! ```
//!
//! # Policies
//! - lru.rs: strict LRU over an index-linked slot arena
//! - ttl.rs: entries expire after a fixed age; full cache rejects inserts
//! - naive.rs: no recency at all; full cache overwrites slot 0
//!
//! # Design Decisions
//! - One mutex per cache guards the whole structure
//! - Values are shared as `Arc<[u8]>` so a hit copies nothing under the lock
//! - Cache state never affects relayed bytes, only later hit/miss outcomes

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{CacheConfig, CachePolicy};

pub mod lru;
pub mod naive;
pub mod ttl;

pub use lru::LruCache;
pub use naive::NaiveCache;
pub use ttl::TtlCache;

/// Bounded map from request fingerprint to response payload.
pub trait ResponseCache: Send + Sync + Debug {
    /// Exact-match lookup.
    fn lookup(&self, key: &[u8]) -> Option<Arc<[u8]>>;

    /// Store a response. Returns false when the policy refused the entry.
    fn insert(&self, key: &[u8], value: &[u8]) -> bool;

    /// Current number of entries.
    fn len(&self) -> usize;

    /// Maximum number of entries.
    fn capacity(&self) -> usize;

    /// Policy implemented by this cache.
    fn policy(&self) -> CachePolicy;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build the configured cache, or `None` when caching is disabled.
pub fn build(config: &CacheConfig) -> Option<Arc<dyn ResponseCache>> {
    if !config.enabled {
        tracing::info!("Response cache disabled");
        return None;
    }

    let cache: Arc<dyn ResponseCache> = match config.policy {
        CachePolicy::Lru => Arc::new(LruCache::new(config.capacity)),
        CachePolicy::Ttl => Arc::new(
            TtlCache::new(config.capacity, Duration::from_secs(config.ttl_secs))
                .reclaim_expired(config.reclaim_expired),
        ),
        CachePolicy::Naive => Arc::new(NaiveCache::new(config.capacity)),
    };

    tracing::info!(
        policy = %config.policy,
        capacity = config.capacity,
        key = ?config.key,
        "Response cache ready"
    );
    Some(cache)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_respects_policy_and_enabled() {
        let mut config = CacheConfig::default();
        for policy in [CachePolicy::Lru, CachePolicy::Ttl, CachePolicy::Naive] {
            config.policy = policy;
            let cache = build(&config).unwrap();
            assert_eq!(cache.policy(), policy);
            assert_eq!(cache.capacity(), config.capacity);
            assert!(cache.is_empty());
        }

        config.enabled = false;
        assert!(build(&config).is_none());
    }
}
