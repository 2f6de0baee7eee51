//! Ledger address formatting.

use crate::error::{TypeError, TypeResult};
use crate::keys::PublicKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prefix carried by every Ember ledger address.
pub const ADDRESS_PREFIX: &str = "ember";

/// Hex digits of hash material carried after the prefix.
const ADDRESS_BODY_LEN: usize = 60;

/// An address on the Ember ledger: the `ember` prefix followed by 60
/// lowercase hex digits of hash material.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerAddress(String);

impl LedgerAddress {
    /// Formats a hash digest as a ledger address, taking the first 60
    /// hex digits of the digest.
    #[must_use]
    pub fn from_hash(digest: &[u8]) -> Self {
        let body = hex::encode(digest);
        Self(format!("{ADDRESS_PREFIX}{}", &body[..ADDRESS_BODY_LEN.min(body.len())]))
    }

    /// Returns the ledger's account address for a public key, used for
    /// balance queries against keys that are not derivation outputs.
    #[must_use]
    pub fn for_key(key: &PublicKey) -> Self {
        let body = key.to_hex();
        Self(format!("{ADDRESS_PREFIX}{}", &body[..ADDRESS_BODY_LEN]))
    }

    /// Parses an address string, checking prefix and length.
    pub fn parse(s: &str) -> TypeResult<Self> {
        let body = s
            .strip_prefix(ADDRESS_PREFIX)
            .ok_or_else(|| TypeError::InvalidAddress(format!("missing {ADDRESS_PREFIX} prefix")))?;
        if body.len() != ADDRESS_BODY_LEN {
            return Err(TypeError::InvalidAddress(format!(
                "expected {ADDRESS_BODY_LEN} hex digits after prefix, got {}",
                body.len()
            )));
        }
        if !body.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidAddress("non-hex character in body".into()));
        }
        Ok(Self(s.to_string()))
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LedgerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for LedgerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LedgerAddress({})", self.0)
    }
}

impl FromStr for LedgerAddress {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
