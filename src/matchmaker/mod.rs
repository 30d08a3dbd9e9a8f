//! Random pairing of waiting connections
//!
//! - `pool`: FIFO waiting pool
//! - `state`: pairing algorithm and partnership bookkeeping
//! - `service`: lock-guarded [`Matchmaker`] wired to the connection registry

mod pool;
mod service;
mod state;

pub use pool::WaitingPool;
pub use service::Matchmaker;
pub use state::{MatchState, MatchStats, Outbox, RoomLabel};
