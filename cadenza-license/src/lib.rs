//! Album purchase orchestration and on-chain license verification.
//!
//! A purchase embeds a co-signed [`LicenseRecord`] in the payment
//! transaction's extra data under tag `0x0B`. Ownership is later
//! proven by scanning the ledger for that tag, filtering to the
//! buyer's key and re-verifying the artist's Ed25519 signature — no
//! central ledger of who owns what.
//!
//! This crate holds both sides:
//!
//! - [`LicenseManager`] drives a purchase through validation, address
//!   derivation, artist co-signing and broadcast.
//! - [`LicenseVerifier`] answers "does this buyer own this album",
//!   with a per-buyer TTL cache and a balance-based premium
//!   entitlement path.
//!
//! The verifier depends only on the record wire format, never on the
//! manager, so serving nodes can run it standalone.

mod error;
mod purchase;
mod record;
mod signing;
mod verify;

pub use error::{LicenseError, LicenseResult};
pub use purchase::{
    CompletedPurchase, LicenseManager, OwnershipCheck, PurchasePhase, PurchaseQuote,
    PurchaseReceipt, PurchaseRequest, ValidatedRequest, CURRENCY, MAX_PRICE_ATOMIC,
    NETWORK_FEE_ATOMIC,
};
pub use record::{
    LicenseOwnership, LicenseRecord, LICENSE_RECORD_VERSION, MAX_RECORD_AGE_SECS,
    MAX_TIMESTAMP_DRIFT_SECS,
};
pub use signing::{ArtistSignature, SignLicenseRequest, SigningClient, SIGNING_TIMEOUT};
pub use verify::{AccessInfo, AccessType, CacheStats, LicenseVerifier, VerifierConfig};
