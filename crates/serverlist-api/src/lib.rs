//! Serverlist REST API
//!
//! This crate provides the Axum-based HTTP surface of the registry:
//! game server registration and liveness endpoints, the public server
//! browser, health checks and Prometheus metrics.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
