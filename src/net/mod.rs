//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept, backlog)
//!     → connection.rs (connection id, live-connection tracking)
//!     → Hand off to the dispatcher
//! ```
//!
//! # Design Decisions
//! - Every accepted connection carries a guard, so the live count is exact
//!   on every exit path (normal, error, panic, cancellation)
//! - Backpressure comes from the dispatch queue, not from the listener

pub mod connection;
pub mod listener;

pub use connection::{Connection, ConnectionId, ConnectionTracker};
pub use listener::{Listener, ListenerError};
