//! Serverlist Authentication
//!
//! This crate verifies HS256 bearer tokens and turns their claims into the
//! caller identity and role the registry authorizes against. It never
//! issues credentials to clients.

pub mod error;
pub mod jwt;
pub mod user;

pub use error::AuthError;
pub use jwt::{Claims, JwtManager};
pub use user::{AuthUser, authenticate, extract_bearer_token};
