//! Hash-based (sticky) load balancing strategy.
//!
//! The dispatch key, normally the client IP in textual form, is hashed with a
//! 32-bit MurmurHash2 mix and reduced modulo the pool size. The mapping is a
//! pure function, so the same client lands on the same backend for the life
//! of the pool without any shared state.

use crate::load_balancer::LoadBalancer;

const SEED: u32 = 0x1234_abcd;
const M: u32 = 0x5bd1_e995;
const R: u32 = 24;

/// 32-bit MurmurHash2 of `key`.
pub fn murmur2(key: &[u8]) -> u32 {
    let mut h = SEED ^ key.len() as u32;

    let mut blocks = key.chunks_exact(4);
    for block in &mut blocks {
        let mut k = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        k = k.wrapping_mul(M);
        k ^= k >> R;
        k = k.wrapping_mul(M);
        h = h.wrapping_mul(M);
        h ^= k;
    }

    let tail = blocks.remainder();
    if !tail.is_empty() {
        for (i, &b) in tail.iter().enumerate() {
            h ^= (b as u32) << (8 * i);
        }
        h = h.wrapping_mul(M);
    }

    h ^= h >> 13;
    h = h.wrapping_mul(M);
    h ^= h >> 15;
    h
}

/// Client-affinity selector.
#[derive(Debug, Default)]
pub struct ConsistentHash;

impl ConsistentHash {
    pub fn new() -> Self {
        Self
    }
}

impl LoadBalancer for ConsistentHash {
    fn select(&self, dispatch_key: &[u8], pool_size: usize) -> usize {
        debug_assert!(pool_size > 0);
        murmur2(dispatch_key) as usize % pool_size
    }

    fn name(&self) -> &'static str {
        "hash"
    }
}
