//! Error types for content access.

use thiserror::Error;

/// Errors raised by the content access gate.
#[derive(Debug, Error)]
pub enum VaultError {
    /// The buyer has no verified license for the requested content.
    /// Deliberately carries no detail about why verification failed.
    #[error("no valid license")]
    NoValidLicense,

    /// The track has no encrypted-content record in the catalog.
    #[error("content unavailable: {0}")]
    ContentUnavailable(String),

    /// The catalog overlay could not be queried.
    #[error("catalog error: {0}")]
    Catalog(String),

    /// No serving node could take the request.
    #[error("no serving node available: {0}")]
    NodeUnavailable(String),

    /// A serving node refused or failed the decryption request.
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// The swarm fallback could not produce a handle.
    #[error("swarm fetch failed: {0}")]
    Swarm(String),

    /// A node call exceeded its deadline.
    #[error("timed out: {0}")]
    Timeout(String),
}

/// Result type for content access operations.
pub type VaultResult<T> = Result<T, VaultError>;
