//! Error types for purchase and verification.

use cadenza_ledger::LedgerError;
use cadenza_paycode::PaycodeError;
use thiserror::Error;

/// Errors raised while purchasing albums or verifying licenses.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// A purchase request failed input validation.
    #[error("invalid purchase request: {0}")]
    InvalidRequest(String),

    /// The buyer cannot cover price plus network fee.
    #[error("insufficient balance: need {required} atomic, have {available}")]
    InsufficientBalance {
        /// Price plus network fee, atomic units.
        required: u64,
        /// Spendable balance, atomic units.
        available: u64,
    },

    /// The artist payment code failed decode or derivation.
    #[error(transparent)]
    PaymentCode(#[from] PaycodeError),

    /// The artist signing service refused, errored or answered
    /// without a usable signature.
    #[error("signing service error: {0}")]
    SigningService(String),

    /// A network call exceeded its deadline.
    #[error("timed out: {0}")]
    Timeout(String),

    /// A ledger or wallet boundary call failed. Broadcast failures
    /// surface here; nothing is on-ledger when they do.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// An extra-data payload did not decode to a license record.
    #[error("license parse error: {0}")]
    Parse(String),

    /// A license record's artist signature did not verify.
    #[error("license signature invalid")]
    SignatureInvalid,
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
