//! Repository backends and the cache-aside decorators in [`cached`].
//!
//! - `inmemory` (default): hash maps behind one lock, nothing persisted
//! - `sqlite`: `rusqlite` on a `tokio-rusqlite` connection thread
//!
//! Exactly one must be enabled, e.g.
//! `cargo build -p campus --no-default-features --features sqlite,memory`.

#[cfg(all(feature = "sqlite", feature = "inmemory"))]
compile_error!("Cannot enable both 'sqlite' and 'inmemory' storage features");

#[cfg(not(any(feature = "sqlite", feature = "inmemory")))]
compile_error!("Enable a storage backend: 'inmemory' or 'sqlite'");

pub mod cached;

#[cfg(any(feature = "inmemory", test))]
pub mod inmemory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use cached::{
    CachedAddressRepository, CachedAttendanceRepository, CachedDisciplinaryActionRepository,
    CachedHealthSafetyRepository, CachedStudentBehaviorRepository, CachedTermRepository,
    CachedUserRepository,
};

#[cfg(any(feature = "inmemory", test))]
pub use inmemory::InMemoryRepository;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteRepository;
