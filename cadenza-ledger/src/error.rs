//! Error types for ledger and wallet boundary calls.

use thiserror::Error;

/// Errors raised at the ledger / wallet boundary.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// An RPC query against the ledger node failed.
    #[error("ledger rpc error: {0}")]
    Rpc(String),

    /// Broadcasting a signed transaction failed.
    #[error("broadcast failed: {0}")]
    Broadcast(String),

    /// The wallet is not connected or refused the operation.
    #[error("wallet error: {0}")]
    Wallet(String),

    /// A boundary call exceeded its deadline.
    #[error("timed out: {0}")]
    Timeout(String),
}

/// Result type for ledger boundary operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
