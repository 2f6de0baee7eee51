//! Error types for payment codes and address derivation.

use thiserror::Error;

/// Errors raised by the payment code codec and address deriver.
#[derive(Debug, Error)]
pub enum PaycodeError {
    /// The serialized payment code fails structural decoding.
    #[error("malformed payment code: {0}")]
    Malformed(String),

    /// A payment code handed to the deriver failed structural decode.
    #[error("invalid payment code: {0}")]
    InvalidCode(String),

    /// A derivation step could not be performed.
    #[error("address derivation failed: {0}")]
    Derivation(String),
}

/// Result type for payment code operations.
pub type PaycodeResult<T> = Result<T, PaycodeError>;
