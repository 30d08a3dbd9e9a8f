//! Connection registry for WebSocket connections
//!
//! This module provides:
//! - Connection identity assignment
//! - Lookup, existence checks and message delivery by identity
//! - Activity tracking for stale connection cleanup

mod registry;
mod stats;
mod types;

pub use registry::ConnectionRegistry;
pub use stats::ConnectionStats;
pub use types::{ConnectionHandle, ConnectionId};
