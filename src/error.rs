//! Error types for the cache
//!
//! Cache operations report absence through `Option`, never through errors.
//! This enum only covers construction and janitor lifecycle failures.

use thiserror::Error;
use tokio::task::JoinError;

// == Cache Error Enum ==
/// Unified error type for the cache crate.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Configuration value rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Janitor was requested outside of a Tokio runtime
    #[error("No Tokio runtime available to run the janitor")]
    NoRuntime,

    /// Janitor task panicked or was aborted before it could be joined
    #[error("Janitor task failed: {0}")]
    JanitorJoin(#[from] JoinError),
}

// == Result Type Alias ==
/// Convenience Result type for the cache crate.
pub type Result<T> = std::result::Result<T, CacheError>;
