//! Functional core for the campus backend.
//!
//! Pure domain types, validation rules, cache-key derivation and the
//! repository/cache abstractions that the server crate implements.

#[cfg(feature = "auth")]
pub mod auth;
pub mod cache;
pub mod clock;
pub mod school;
pub mod serde;
pub mod storage;
