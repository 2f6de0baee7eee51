//! Payment code wire codec.
//!
//! Wire format: `PC` + 2-hex-digit version + 2-hex-digit features +
//! 64-hex-digit public key + 64-hex-digit chain code, 134 characters
//! total. Anything else is a decode error.

use crate::error::{PaycodeError, PaycodeResult};
use cadenza_types::{PublicKey, SecretKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Total length of a serialized payment code.
pub const PAYMENT_CODE_LEN: usize = 134;

/// Prefix of every serialized payment code.
pub const PAYMENT_CODE_PREFIX: &str = "PC";

/// An artist's reusable payment code: a static public key and chain
/// code bundle, immutable once published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentCode {
    version: u8,
    features: u8,
    public_key: PublicKey,
    chain_code: [u8; 32],
}

impl PaymentCode {
    /// Builds a payment code from its fields. Pure construction; the
    /// wire form is produced by [`PaymentCode::encode`].
    #[must_use]
    pub const fn new(public_key: PublicKey, chain_code: [u8; 32], version: u8, features: u8) -> Self {
        Self {
            version,
            features,
            public_key,
            chain_code,
        }
    }

    /// Builds a fresh version-1 payment code for an artist, deriving
    /// the chain code from the artist's secret.
    #[must_use]
    pub fn for_artist(public_key: PublicKey, artist_secret: &SecretKey) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(artist_secret.as_bytes());
        hasher.update(b"chain");
        let chain_code: [u8; 32] = hasher.finalize().into();
        Self::new(public_key, chain_code, 1, 0)
    }

    /// Serializes to the 134-character wire form.
    #[must_use]
    pub fn encode(&self) -> String {
        format!(
            "{PAYMENT_CODE_PREFIX}{:02x}{:02x}{}{}",
            self.version,
            self.features,
            self.public_key.to_hex(),
            hex::encode(self.chain_code)
        )
    }

    /// Decodes a serialized payment code, rejecting any deviation from
    /// the wire format.
    pub fn decode(serialized: &str) -> PaycodeResult<Self> {
        if !serialized.is_ascii() {
            return Err(PaycodeError::Malformed("non-ascii characters".into()));
        }
        if !serialized.starts_with(PAYMENT_CODE_PREFIX) {
            return Err(PaycodeError::Malformed(format!(
                "must start with {PAYMENT_CODE_PREFIX:?}"
            )));
        }
        if serialized.len() != PAYMENT_CODE_LEN {
            return Err(PaycodeError::Malformed(format!(
                "expected {PAYMENT_CODE_LEN} characters, got {}",
                serialized.len()
            )));
        }
        let version = u8::from_str_radix(&serialized[2..4], 16)
            .map_err(|_| PaycodeError::Malformed("version is not hex".into()))?;
        let features = u8::from_str_radix(&serialized[4..6], 16)
            .map_err(|_| PaycodeError::Malformed("features is not hex".into()))?;
        let public_key = PublicKey::parse(&serialized[6..70])
            .map_err(|e| PaycodeError::Malformed(format!("bad public key: {e}")))?;
        let chain_bytes = hex::decode(&serialized[70..134])
            .map_err(|_| PaycodeError::Malformed("chain code is not hex".into()))?;
        let chain_code: [u8; 32] = chain_bytes
            .as_slice()
            .try_into()
            .map_err(|_| PaycodeError::Malformed("bad chain code length".into()))?;
        Ok(Self {
            version,
            features,
            public_key,
            chain_code,
        })
    }

    /// Non-throwing structural diagnostic for UI feedback. Unlike
    /// [`PaymentCode::decode`], this enumerates every defect found
    /// rather than stopping at the first.
    #[must_use]
    pub fn validate_structure(serialized: &str) -> StructureReport {
        let mut errors = Vec::new();

        if !serialized.is_ascii() {
            return StructureReport {
                valid: false,
                errors: vec!["non-ascii characters".to_string()],
            };
        }
        if !serialized.starts_with(PAYMENT_CODE_PREFIX) {
            errors.push(format!("must start with {PAYMENT_CODE_PREFIX:?} prefix"));
        }
        if serialized.len() < PAYMENT_CODE_LEN {
            errors.push("payment code too short".to_string());
        }
        if serialized.len() > PAYMENT_CODE_LEN {
            errors.push("payment code too long".to_string());
        }

        if serialized.len() >= PAYMENT_CODE_LEN {
            match u8::from_str_radix(&serialized[2..4], 16) {
                Ok(0) => errors.push("invalid version".to_string()),
                Ok(_) => {}
                Err(_) => errors.push("version is not hex".to_string()),
            }
            if PublicKey::parse(&serialized[6..70]).is_err() {
                errors.push("invalid public key".to_string());
            }
            match hex::decode(&serialized[70..134.min(serialized.len())]) {
                Ok(bytes) if bytes.len() != 32 => {
                    errors.push("invalid chain code length".to_string());
                }
                Ok(_) => {}
                Err(_) => errors.push("chain code is not hex".to_string()),
            }
        }

        StructureReport {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// The artist's static public key.
    #[must_use]
    pub const fn artist_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The chain code.
    #[must_use]
    pub const fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    /// Wire format version.
    #[must_use]
    pub const fn version(&self) -> u8 {
        self.version
    }

    /// Feature flags.
    #[must_use]
    pub const fn features(&self) -> u8 {
        self.features
    }

    /// Truncated form for UI display, e.g. `PC01000a1b…8f9e`.
    #[must_use]
    pub fn display_short(&self) -> String {
        let encoded = self.encode();
        format!("{}\u{2026}{}", &encoded[..10], &encoded[encoded.len() - 4..])
    }
}

impl fmt::Display for PaymentCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

/// Outcome of [`PaymentCode::validate_structure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureReport {
    /// Whether the serialized form is structurally valid.
    pub valid: bool,
    /// Every structural defect found.
    pub errors: Vec<String>,
}
