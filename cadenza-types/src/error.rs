//! Error type for value parsing and validation.

use thiserror::Error;

/// Errors raised when parsing or validating a value type.
#[derive(Debug, Error)]
pub enum TypeError {
    /// A hex field failed to decode.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// A byte field has the wrong length.
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Expected byte length.
        expected: usize,
        /// Actual byte length.
        actual: usize,
    },

    /// A ledger address is malformed.
    #[error("invalid ledger address: {0}")]
    InvalidAddress(String),

    /// An album or track identifier is malformed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A coin amount string failed to parse.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

/// Result type for value parsing.
pub type TypeResult<T> = Result<T, TypeError>;
