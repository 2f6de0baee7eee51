//! Boundary traits for the external collaborators of the protocol
//! core: the Ember ledger RPC surface and the buyer's wallet
//! capability.
//!
//! The ledger node and the wallet's key storage are out of scope; this
//! crate pins down exactly what the core consumes from each — balance
//! queries, tagged-transaction lookup, broadcast, and sign-a-payload —
//! and ships in-memory implementations for tests.

mod error;
mod rpc;
mod tx;
mod wallet;

pub use error::{LedgerError, LedgerResult};
pub use rpc::{mock::MockLedger, LedgerRpc};
pub use tx::{SignedTransaction, Transaction, UnsignedTransaction, LICENSE_EXTRA_TAG};
pub use wallet::{mock::MemoryWallet, WalletSigner};
