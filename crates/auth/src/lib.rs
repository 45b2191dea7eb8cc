//! Password authentication for campus.
//!
//! This crate provides:
//! - Username/email + password login with bcrypt hashes
//! - Cookie sessions (in-memory, SQLite or Redis via feature flags)
//! - HS256 bearer tokens
//! - Axum extractors for authentication

mod config;
mod error;
mod extractors;
mod handlers;
mod jwt;
mod password;
mod sessions;
mod state;

pub use config::AuthConfig;
pub use error::AuthError;
pub use extractors::{CurrentUser, OptionalUser};
pub use handlers::{auth_routes, LoginRequest};
pub use jwt::{issue_token, validate_token, Claims};
pub use password::{hash_password, verify_password};
pub use sessions::InMemorySessionStore;
#[cfg(any(feature = "sqlite", feature = "redis"))]
pub use sessions::SessionStore;
pub use state::AuthState;
