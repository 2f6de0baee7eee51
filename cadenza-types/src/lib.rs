//! Shared vocabulary types for the Cadenza marketplace core.
//!
//! Everything here is a plain value type: public keys and signatures as
//! hex-encoded byte arrays, ledger addresses with the `ember` prefix,
//! atomic coin amounts, and the catalog identifiers (albums, tracks)
//! the protocol passes between components. No I/O lives in this crate.

mod address;
mod amount;
mod balance;
mod error;
mod ids;
mod keys;

pub use address::{LedgerAddress, ADDRESS_PREFIX};
pub use amount::{format_coins, parse_coins, ATOMIC_PER_COIN};
pub use balance::Balance;
pub use error::{TypeError, TypeResult};
pub use ids::{AlbumId, TrackId, TxHash};
pub use keys::{PublicKey, SecretKey};
