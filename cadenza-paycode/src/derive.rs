//! Unlinkable payment address derivation.
//!
//! Implements the three-step pipeline described in the crate docs.
//! Derivation is deterministic: the same buyer secret, payment code
//! and index always produce the same address, which is what lets the
//! artist re-derive addresses to recognize incoming payments.

use crate::code::PaymentCode;
use crate::error::{PaycodeError, PaycodeResult};
use cadenza_types::{LedgerAddress, PublicKey, SecretKey};
use sha2::{Digest, Sha256};
use tracing::warn;

/// A payment address derived for one purchase attempt.
#[derive(Debug, Clone)]
pub struct DerivedPaymentAddress {
    /// The derived one-time address.
    pub address: LedgerAddress,
    /// The derivation index.
    pub index: u32,
    /// The buyer/artist shared secret used for this derivation.
    pub shared_secret: [u8; 32],
}

/// Step 1: hash-based key agreement between the buyer's secret and the
/// artist's static public key.
///
/// This is a stand-in for true elliptic-curve ECDH; a production
/// deployment must substitute a real key agreement with the same
/// 32-byte output so steps 2 and 3 are unaffected.
fn shared_secret(buyer_secret: &SecretKey, artist_key: &PublicKey) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(buyer_secret.as_bytes());
    hasher.update(artist_key.as_bytes());
    hasher.finalize().into()
}

/// Step 2: index-specific secret from the shared secret and chain code.
fn address_secret(shared: &[u8; 32], chain_code: &[u8; 32], index: u32) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(shared);
    hasher.update(chain_code);
    hasher.update(index.to_be_bytes());
    hasher.finalize().into()
}

/// Step 3: the address digest. The index is rendered as *unpadded*
/// lowercase ascii hex here (unlike the big-endian bytes of step 2);
/// already-issued addresses depend on this asymmetry.
fn payment_address(artist_key: &PublicKey, addr_secret: &[u8; 32], index: u32) -> LedgerAddress {
    let mut hasher = Sha256::new();
    hasher.update(artist_key.as_bytes());
    hasher.update(addr_secret);
    hasher.update(format!("{index:x}").as_bytes());
    let digest = hasher.finalize();
    LedgerAddress::from_hash(&digest)
}

fn derive_at(code: &PaymentCode, buyer_secret: &SecretKey, index: u32) -> PaycodeResult<DerivedPaymentAddress> {
    if buyer_secret.as_bytes().iter().all(|&b| b == 0) {
        return Err(PaycodeError::Derivation("buyer secret is all zeroes".into()));
    }
    let shared = shared_secret(buyer_secret, code.artist_key());
    let secret = address_secret(&shared, code.chain_code(), index);
    let address = payment_address(code.artist_key(), &secret, index);
    Ok(DerivedPaymentAddress {
        address,
        index,
        shared_secret: shared,
    })
}

/// Derives the payment address for one purchase.
///
/// Deterministic given identical inputs. Index 0 is the convention for
/// a buyer's first purchase from an artist; callers tracking prior
/// purchases pass a fresh index per purchase.
///
/// # Errors
///
/// Returns [`PaycodeError::InvalidCode`] if `serialized_code` fails
/// structural decode, or [`PaycodeError::Derivation`] if a pipeline
/// step cannot run. No partial derivation output escapes on error.
pub fn derive_payment_address(
    serialized_code: &str,
    buyer_secret: &SecretKey,
    index: u32,
) -> PaycodeResult<LedgerAddress> {
    let code = PaymentCode::decode(serialized_code)
        .map_err(|e| PaycodeError::InvalidCode(e.to_string()))?;
    Ok(derive_at(&code, buyer_secret, index)?.address)
}

/// Derives up to `count` addresses at indices `0..count` for
/// address-cycling UIs.
///
/// A failure at one index is logged and skipped; the batch itself
/// never fails once the code decodes.
pub fn derive_multiple_addresses(
    serialized_code: &str,
    buyer_secret: &SecretKey,
    count: u32,
) -> PaycodeResult<Vec<DerivedPaymentAddress>> {
    let code = PaymentCode::decode(serialized_code)
        .map_err(|e| PaycodeError::InvalidCode(e.to_string()))?;
    let mut derived = Vec::with_capacity(count as usize);
    for index in 0..count {
        match derive_at(&code, buyer_secret, index) {
            Ok(d) => derived.push(d),
            Err(e) => warn!(index, error = %e, "skipping address index"),
        }
    }
    Ok(derived)
}

/// Checks whether `candidate` was derived from this payment code by
/// this buyer, brute-forcing indices `0..max_index`.
///
/// Returns the matching index, or `None` if no index matches. Used by
/// artists to recognize which purchase an incoming payment belongs to.
pub fn validate_derived_address(
    candidate: &LedgerAddress,
    serialized_code: &str,
    buyer_secret: &SecretKey,
    max_index: u32,
) -> PaycodeResult<Option<u32>> {
    let code = PaymentCode::decode(serialized_code)
        .map_err(|e| PaycodeError::InvalidCode(e.to_string()))?;
    for index in 0..max_index {
        match derive_at(&code, buyer_secret, index) {
            Ok(d) if &d.address == candidate => return Ok(Some(index)),
            Ok(_) => {}
            Err(e) => warn!(index, error = %e, "skipping address index during validation"),
        }
    }
    Ok(None)
}

/// Deterministic notification address an artist can watch to learn a
/// given buyer has started paying them.
pub fn notification_address(
    serialized_code: &str,
    buyer_key: &PublicKey,
) -> PaycodeResult<LedgerAddress> {
    let code = PaymentCode::decode(serialized_code)
        .map_err(|e| PaycodeError::InvalidCode(e.to_string()))?;
    let mut hasher = Sha256::new();
    hasher.update(code.artist_key().as_bytes());
    hasher.update(buyer_key.as_bytes());
    hasher.update(b"notification");
    Ok(LedgerAddress::from_hash(&hasher.finalize()))
}
