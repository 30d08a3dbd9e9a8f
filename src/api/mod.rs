//! API layer - HTTP endpoint handlers organized by domain.

mod connection;
mod health;
mod metrics;
mod routes;

pub use connection::{get_connection, ConnectionStatusResponse, MatchStatus};
pub use health::{health, stats};
pub use metrics::prometheus_metrics;
pub use routes::api_routes;
