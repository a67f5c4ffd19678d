//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Cache miss in a session
//!     → pool.rs (fixed backend list)
//!     → Apply load balancing algorithm:
//!         - round_robin.rs (rotate through backends)
//!         - hash.rs (client address → same backend every time)
//!     → backend.rs (open a fresh connection)
//! ```
//!
//! # Design Decisions
//! - Algorithm chosen once at startup from configuration
//! - Pool is immutable; no health tracking or runtime membership changes
//! - No retry against another backend when the selected one is down

use std::fmt::Debug;

use crate::config::Strategy;

pub mod backend;
pub mod hash;
pub mod pool;
pub mod round_robin;

pub use backend::BackendEndpoint;
pub use pool::{BackendPool, PoolError};

/// Maps a dispatch key to an index in `[0, pool_size)`.
pub trait LoadBalancer: Send + Sync + Debug {
    /// Pick a backend index. `pool_size` is always at least one.
    fn select(&self, dispatch_key: &[u8], pool_size: usize) -> usize;

    /// Algorithm name for logs.
    fn name(&self) -> &'static str;
}

/// Build the algorithm for a configured strategy.
pub fn build(strategy: Strategy) -> Box<dyn LoadBalancer> {
    match strategy {
        Strategy::RoundRobin => Box::new(round_robin::RoundRobin::new()),
        Strategy::Hash => Box::new(hash::ConsistentHash::new()),
    }
}
