//! Heartbeat-gated server registry

mod access;
mod manager;
mod sweeper;
mod view;

pub use access::is_authorized;
pub use manager::{RegistryManager, SweepReport};
pub use sweeper::{SweeperHandle, spawn_sweeper};
pub use view::ServerView;
