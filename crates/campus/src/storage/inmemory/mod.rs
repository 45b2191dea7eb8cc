//! In-memory storage backend for testing and development.
//!
//! All tables live behind one `tokio::sync::RwLock`, so cascades and
//! reference checks that span several tables happen atomically. The backend
//! enforces the same uniqueness, cascade and restrict rules as the SQLite
//! schema.
//!
//! # Example
//!
//! ```rust,ignore
//! use campus::storage::inmemory::InMemoryRepository;
//!
//! let repo = InMemoryRepository::new();
//! // Use repo for testing...
//! ```

mod repository;

pub use repository::InMemoryRepository;
