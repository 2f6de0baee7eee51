//! Reusable payment codes and unlinkable payment address derivation.
//!
//! An artist publishes a single *payment code*: a static public key
//! plus a chain code, wire-encoded as a fixed 134-character `PC…`
//! string. From that one code a buyer derives an unbounded sequence of
//! fresh payment addresses that third parties cannot link to the
//! artist, while the artist can re-derive the same addresses to notice
//! incoming payments.
//!
//! # Derivation pipeline
//!
//! Three fixed steps, frozen for interoperability with already-issued
//! codes:
//!
//! 1. `shared_secret = SHA-256(buyer_secret || artist_public_key)`
//! 2. `address_secret = SHA-256(shared_secret || chain_code || be32(index))`
//! 3. `address = ember-format(SHA-256(artist_public_key || address_secret || ascii_hex(index)))`
//!
//! Step 1 is a hash-based stand-in for true ECDH; a production key
//! agreement must keep the same input/output shape so the rest of the
//! pipeline is unaffected.

mod code;
mod derive;
mod error;

pub use code::{PaymentCode, StructureReport, PAYMENT_CODE_LEN, PAYMENT_CODE_PREFIX};
pub use derive::{
    derive_multiple_addresses, derive_payment_address, notification_address,
    validate_derived_address, DerivedPaymentAddress,
};
pub use error::{PaycodeError, PaycodeResult};
