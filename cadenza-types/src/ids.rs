//! Catalog and ledger identifiers.

use crate::error::{TypeError, TypeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MAX_ID_LEN: usize = 64;

fn check_id(s: &str, kind: &str) -> TypeResult<()> {
    if s.is_empty() || s.len() > MAX_ID_LEN {
        return Err(TypeError::InvalidId(format!(
            "{kind} must be 1..={MAX_ID_LEN} characters"
        )));
    }
    if !s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(TypeError::InvalidId(format!(
            "{kind} may only contain [A-Za-z0-9_-]"
        )));
    }
    Ok(())
}

/// Identifier of an album in the catalog.
///
/// 1–64 characters of `[A-Za-z0-9_-]`; this exact string is embedded
/// in license records, so it is validated on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlbumId(String);

impl AlbumId {
    /// Validates and wraps an album identifier.
    pub fn parse(s: &str) -> TypeResult<Self> {
        check_id(s, "album id")?;
        Ok(Self(s.to_string()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlbumId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AlbumId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Identifier of a track within an album.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    /// Validates and wraps a track identifier.
    pub fn parse(s: &str) -> TypeResult<Self> {
        check_id(s, "track id")?;
        Ok(Self(s.to_string()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TrackId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Hash of a broadcast transaction, as reported by the ledger.
/// Opaque to this core; carried as-is into license proofs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(String);

impl TxHash {
    /// Wraps a transaction hash string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the hash as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn album_id_accepts_valid() {
        assert!(AlbumId::parse("midnight-sessions_01").is_ok());
        assert!(AlbumId::parse("A1").is_ok());
    }

    #[test]
    fn album_id_rejects_invalid() {
        assert!(AlbumId::parse("").is_err());
        assert!(AlbumId::parse("has space").is_err());
        assert!(AlbumId::parse(&"x".repeat(65)).is_err());
    }
}
