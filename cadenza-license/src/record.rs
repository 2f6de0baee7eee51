//! The license record embedded in payment transactions.
//!
//! Wire form is the JSON serialization of [`LicenseRecord`] carried
//! under extra-data tag `0x0B`. The artist's Ed25519 signature covers
//! the canonical payload
//! `"{albumId}:{hex(buyerKey)}:{purchaseAmount}:{timestamp}:{version}"`,
//! so any post-signing tamper of those fields is detectable by every
//! later scan. Records are immutable once signed and never deleted;
//! ownership proof holds for the life of the ledger.

use crate::error::{LicenseError, LicenseResult};
use cadenza_types::{AlbumId, PublicKey, TxHash};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

/// The only supported record version. Other versions are rejected
/// outright, not merely warned about.
pub const LICENSE_RECORD_VERSION: u8 = 1;

/// Maximum tolerated clock drift into the future, seconds.
pub const MAX_TIMESTAMP_DRIFT_SECS: i64 = 300;

/// Maximum record age accepted by structural validation, seconds.
pub const MAX_RECORD_AGE_SECS: i64 = 365 * 86_400;

/// A signed proof-of-purchase, as embedded in a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseRecord {
    /// The purchased album.
    pub album_id: AlbumId,
    /// The buyer's public key; ownership queries filter on this.
    pub buyer_key: PublicKey,
    /// Purchase amount in atomic units.
    pub purchase_amount: u64,
    /// Purchase time, unix seconds.
    pub timestamp: i64,
    /// The artist's Ed25519 public key.
    pub artist_key: PublicKey,
    /// Hex-encoded Ed25519 signature over the canonical payload.
    pub artist_signature: String,
    /// Record version; must equal [`LICENSE_RECORD_VERSION`].
    pub version: u8,
}

impl LicenseRecord {
    /// Assembles a signed record from its parts. The signature is not
    /// checked here; callers verify via [`LicenseRecord::verify_signature`].
    #[must_use]
    pub fn assemble(
        album_id: AlbumId,
        buyer_key: PublicKey,
        purchase_amount: u64,
        timestamp: i64,
        artist_key: PublicKey,
        artist_signature: String,
    ) -> Self {
        Self {
            album_id,
            buyer_key,
            purchase_amount,
            timestamp,
            artist_key,
            artist_signature,
            version: LICENSE_RECORD_VERSION,
        }
    }

    /// The canonical byte string the artist signs. Must stay in
    /// lockstep with artist signing services.
    #[must_use]
    pub fn signing_payload_for(
        album_id: &AlbumId,
        buyer_key: &PublicKey,
        purchase_amount: u64,
        timestamp: i64,
        version: u8,
    ) -> String {
        format!(
            "{album_id}:{}:{purchase_amount}:{timestamp}:{version}",
            buyer_key.to_hex()
        )
    }

    /// The canonical signing payload of this record.
    #[must_use]
    pub fn signing_payload(&self) -> String {
        Self::signing_payload_for(
            &self.album_id,
            &self.buyer_key,
            self.purchase_amount,
            self.timestamp,
            self.version,
        )
    }

    /// Verifies the artist signature over the canonical payload.
    /// Returns `false` for any defect (bad hex, bad key, bad
    /// signature) rather than distinguishing them; scans drop the
    /// record either way.
    #[must_use]
    pub fn verify_signature(&self) -> bool {
        let Ok(sig_bytes) = hex::decode(&self.artist_signature) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(&sig_bytes) else {
            return false;
        };
        let Ok(verifying_key) = VerifyingKey::from_bytes(self.artist_key.as_bytes()) else {
            return false;
        };
        verifying_key
            .verify(self.signing_payload().as_bytes(), &signature)
            .is_ok()
    }

    /// Structural validation: sane timestamp window, positive amount,
    /// pinned version. `now` is unix seconds.
    pub fn validate_structure(&self, now: i64) -> LicenseResult<()> {
        if self.timestamp > now + MAX_TIMESTAMP_DRIFT_SECS {
            return Err(LicenseError::Parse("timestamp too far in the future".into()));
        }
        if self.timestamp < now - MAX_RECORD_AGE_SECS {
            return Err(LicenseError::Parse("record older than one year".into()));
        }
        if self.purchase_amount == 0 {
            return Err(LicenseError::Parse("purchase amount must be positive".into()));
        }
        if self.version != LICENSE_RECORD_VERSION {
            return Err(LicenseError::Parse(format!(
                "unsupported record version {}",
                self.version
            )));
        }
        Ok(())
    }

    /// Serializes to the extra-data wire form.
    pub fn to_extra_payload(&self) -> LicenseResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| LicenseError::Parse(e.to_string()))
    }

    /// Parses an extra-data payload. All seven fields must be present.
    pub fn from_extra_payload(payload: &[u8]) -> LicenseResult<Self> {
        serde_json::from_slice(payload).map_err(|e| LicenseError::Parse(e.to_string()))
    }
}

/// A verified view of a discovered license, as surfaced to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseOwnership {
    /// The purchased album.
    pub album_id: AlbumId,
    /// The owning buyer's public key.
    pub owner_key: PublicKey,
    /// Purchase amount in atomic units.
    pub purchase_amount: u64,
    /// Purchase time, unix seconds.
    pub timestamp: i64,
    /// Hash of the transaction carrying the record.
    pub tx_hash: TxHash,
    /// Whether structural validation and signature verification both
    /// passed. Only verified entries ever count as ownership.
    pub verified: bool,
    /// The signing artist's public key.
    pub artist_key: PublicKey,
}
