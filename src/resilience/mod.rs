//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Session network call:
//!     → timeouts.rs (enforce connect / per-operation deadline)
//!     → On expiry or error: session ends, client socket closed
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every network call has a deadline
//! - No retries: a failed backend connect aborts the session

pub mod timeouts;

pub use timeouts::{within, Deadlines};
