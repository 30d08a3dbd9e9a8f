// Shared infrastructure
pub mod config;
pub mod error;
pub mod metrics;

// Domain layer (matching and relay)
pub mod connection_manager;
pub mod hub;
pub mod matchmaker;
pub mod relay;

// Application layer
pub mod api;
pub mod server;
pub mod websocket;

// Supporting modules
pub mod tasks;
