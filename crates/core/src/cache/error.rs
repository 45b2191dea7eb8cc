use thiserror::Error;

/// Failure talking to a cache backend.
///
/// Callers treat every variant the same way (log, then fall back to
/// storage); the split only matters for log readers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The backend could not be reached.
    #[error("cache unavailable: {0}")]
    Unavailable(String),
    /// The backend was reached but rejected the command.
    #[error("cache command failed: {0}")]
    Command(String),
}

pub type Result<T> = std::result::Result<T, CacheError>;
