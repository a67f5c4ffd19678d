//! Round-robin load balancing strategy.

use std::sync::{Mutex, PoisonError};
use crate::load_balancer::LoadBalancer;

/// Round-robin selector.
/// Stores the next index to hand out; read-then-advance happens under one lock
/// so concurrent callers never observe the same value.
#[derive(Debug, Default)]
pub struct RoundRobin {
    next: Mutex<usize>,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoadBalancer for RoundRobin {
    fn select(&self, _dispatch_key: &[u8], pool_size: usize) -> usize {
        debug_assert!(pool_size > 0);
        let mut next = self.next.lock().unwrap_or_else(PoisonError::into_inner);
        let current = *next % pool_size;
        *next = (current + 1) % pool_size;
        current
    }

    fn name(&self) -> &'static str {
        "round_robin"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_round_robin() {
        let lb = RoundRobin::new();
        let picks: Vec<usize> = (0..7).map(|_| lb.select(b"ignored", 3)).collect();
        assert_eq!(picks, vec![0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn key_is_ignored() {
        let lb = RoundRobin::new();
        assert_eq!(lb.select(b"10.0.0.1", 2), 0);
        assert_eq!(lb.select(b"10.0.0.1", 2), 1);
    }

    #[test]
    fn concurrent_callers_share_one_cycle() {
        let lb = Arc::new(RoundRobin::new());
        let pool_size = 4;
        let threads = 8;
        let per_thread = 1000;

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let lb = lb.clone();
                std::thread::spawn(move || {
                    let mut counts = vec![0usize; pool_size];
                    for _ in 0..per_thread {
                        counts[lb.select(b"", pool_size)] += 1;
                    }
                    counts
                })
            })
            .collect();

        let mut totals = vec![0usize; pool_size];
        for handle in handles {
            for (i, c) in handle.join().unwrap().into_iter().enumerate() {
                totals[i] += c;
            }
        }

        // No read was duplicated or skipped: every index got exactly its share.
        let expected = threads * per_thread / pool_size;
        assert!(totals.iter().all(|&c| c == expected), "{totals:?}");
        // And the counter ended where it started.
        assert_eq!(lb.select(b"", pool_size), 0);
    }
}
