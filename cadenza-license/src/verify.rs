//! On-chain license verification with a per-buyer TTL cache.
//!
//! Ownership is re-derived from the ledger on demand: query every
//! transaction tagged `0x0B`, parse candidates, keep the buyer's,
//! verify each artist signature, cache the result for a few minutes.
//! Ledger failures degrade to "no licenses found this call" — access
//! decisions fail closed, never open.

use crate::record::{LicenseOwnership, LicenseRecord};
use cadenza_ledger::{LedgerRpc, LICENSE_EXTRA_TAG};
use cadenza_types::{AlbumId, LedgerAddress, PublicKey};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Tunable verification policy. The defaults mirror the deployed
/// network; none of these are protocol invariants.
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// How long a buyer's scan result stays fresh.
    pub cache_ttl: Duration,
    /// Block window for the first incremental scan.
    pub initial_scan_window: u64,
    /// Premium entitlement threshold on the primary coin, atomic.
    pub premium_coin_threshold: u64,
    /// Premium entitlement threshold on the utility token, atomic.
    pub premium_token_threshold: u64,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(300),
            initial_scan_window: 10_000,
            premium_coin_threshold: 100_000,
            premium_token_threshold: 1_000_000,
        }
    }
}

/// How a buyer's access to an album was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    /// A verified license record on the ledger.
    License,
    /// Balance-based premium entitlement.
    Premium,
    /// No access.
    None,
}

/// Aggregated access answer for one buyer and album.
#[derive(Debug, Clone)]
pub struct AccessInfo {
    /// A verified license exists for the album.
    pub has_license: bool,
    /// The buyer clears a premium balance threshold.
    pub is_premium: bool,
    /// `has_license || is_premium`.
    pub has_access: bool,
    /// Most recent verified license, if any.
    pub license_details: Option<LicenseOwnership>,
    /// License takes precedence over premium.
    pub access_type: AccessType,
}

/// Cache introspection snapshot.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Buyers currently cached.
    pub entries: usize,
    /// Upper bound of the last incremental scan, 0 if none ran.
    pub last_scan_block: u64,
    /// Configured TTL.
    pub cache_ttl: Duration,
}

struct CacheEntry {
    licenses: Vec<LicenseOwnership>,
    cached_at: Instant,
}

/// Answers ownership and entitlement queries against the ledger.
///
/// Each instance owns its cache; construct isolated instances freely
/// (tests do). Concurrent queries for different buyers never
/// cross-contaminate entries — the cache is keyed per buyer key.
pub struct LicenseVerifier {
    rpc: Arc<dyn LedgerRpc>,
    config: VerifierConfig,
    cache: RwLock<HashMap<PublicKey, CacheEntry>>,
    last_scan_block: AtomicU64,
}

impl LicenseVerifier {
    /// Creates a verifier with default policy.
    #[must_use]
    pub fn new(rpc: Arc<dyn LedgerRpc>) -> Self {
        Self::with_config(rpc, VerifierConfig::default())
    }

    /// Creates a verifier with explicit policy.
    #[must_use]
    pub fn with_config(rpc: Arc<dyn LedgerRpc>, config: VerifierConfig) -> Self {
        Self {
            rpc,
            config,
            cache: RwLock::new(HashMap::new()),
            last_scan_block: AtomicU64::new(0),
        }
    }

    /// Returns all verified-or-not license views for a buyer, newest
    /// first. Serves from cache within the TTL; otherwise rescans the
    /// full chain. A failed ledger query yields an empty, uncached
    /// result, so the next call retries.
    pub async fn get_user_licenses(&self, buyer: &PublicKey) -> Vec<LicenseOwnership> {
        {
            let cache = self.cache.read().await;
            if let Some(entry) = cache.get(buyer) {
                if entry.cached_at.elapsed() <= self.config.cache_ttl {
                    return entry.licenses.clone();
                }
            }
        }

        match self.scan_range(buyer, None, None).await {
            Ok(licenses) => {
                self.cache.write().await.insert(
                    *buyer,
                    CacheEntry {
                        licenses: licenses.clone(),
                        cached_at: Instant::now(),
                    },
                );
                licenses
            }
            Err(e) => {
                warn!(buyer = %buyer, error = %e, "license scan failed; treating as zero licenses");
                Vec::new()
            }
        }
    }

    /// Evicts the buyer's cache entry and rescans.
    pub async fn refresh_user_licenses(&self, buyer: &PublicKey) -> Vec<LicenseOwnership> {
        self.cache.write().await.remove(buyer);
        self.get_user_licenses(buyer).await
    }

    /// Incremental scan over blocks since the previous call. The first
    /// call looks back `initial_scan_window` blocks. An optimization
    /// only: a full [`LicenseVerifier::get_user_licenses`] rescan
    /// always produces a superset of these results.
    pub async fn scan_new_licenses(&self, buyer: &PublicKey) -> Vec<LicenseOwnership> {
        let current = match self.rpc.current_block_height().await {
            Ok(height) => height,
            Err(e) => {
                warn!(error = %e, "height query failed; skipping incremental scan");
                return Vec::new();
            }
        };
        let last = self.last_scan_block.load(Ordering::SeqCst);
        let from = if last == 0 {
            current.saturating_sub(self.config.initial_scan_window)
        } else {
            last
        };

        match self.scan_range(buyer, Some(from), Some(current)).await {
            Ok(licenses) => {
                self.last_scan_block.store(current, Ordering::SeqCst);
                licenses
            }
            Err(e) => {
                warn!(buyer = %buyer, error = %e, "incremental scan failed");
                Vec::new()
            }
        }
    }

    /// True iff a verified license for the album exists.
    pub async fn has_license(&self, buyer: &PublicKey, album: &AlbumId) -> bool {
        self.get_user_licenses(buyer)
            .await
            .iter()
            .any(|l| &l.album_id == album && l.verified)
    }

    /// Most recent verified license for the album, if any.
    pub async fn get_license_details(
        &self,
        buyer: &PublicKey,
        album: &AlbumId,
    ) -> Option<LicenseOwnership> {
        self.get_user_licenses(buyer)
            .await
            .into_iter()
            .find(|l| &l.album_id == album && l.verified)
    }

    /// Balance-based premium entitlement: the buyer holds at least the
    /// coin threshold of EMB or the token threshold of CIN. Evaluated
    /// on demand against the ledger, not a license.
    pub async fn has_premium_access(&self, buyer: &PublicKey) -> bool {
        match self.rpc.balance(&LedgerAddress::for_key(buyer)).await {
            Ok(balance) => {
                balance.coin >= self.config.premium_coin_threshold
                    || balance.token >= self.config.premium_token_threshold
            }
            Err(e) => {
                warn!(buyer = %buyer, error = %e, "balance query failed; denying premium");
                false
            }
        }
    }

    /// Aggregated access answer. `access_type` prioritizes a license
    /// over premium over nothing.
    pub async fn get_user_access_info(&self, buyer: &PublicKey, album: &AlbumId) -> AccessInfo {
        let license_details = self.get_license_details(buyer, album).await;
        let has_license = license_details.is_some();
        let is_premium = self.has_premium_access(buyer).await;
        let access_type = if has_license {
            AccessType::License
        } else if is_premium {
            AccessType::Premium
        } else {
            AccessType::None
        };
        AccessInfo {
            has_license,
            is_premium,
            has_access: has_license || is_premium,
            license_details,
            access_type,
        }
    }

    /// Drops every cache entry and resets the incremental scan cursor.
    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
        self.last_scan_block.store(0, Ordering::SeqCst);
    }

    /// Cache introspection for dashboards and tests.
    pub async fn cache_stats(&self) -> CacheStats {
        CacheStats {
            entries: self.cache.read().await.len(),
            last_scan_block: self.last_scan_block.load(Ordering::SeqCst),
            cache_ttl: self.config.cache_ttl,
        }
    }

    /// Queries the tagged-transaction range and reduces it to license
    /// views for one buyer. Records that fail to parse are dropped
    /// with a warning; records that parse but fail validation or
    /// signature verification are kept with `verified == false` so
    /// diagnostics can see them, and never count as ownership.
    async fn scan_range(
        &self,
        buyer: &PublicKey,
        from_block: Option<u64>,
        to_block: Option<u64>,
    ) -> Result<Vec<LicenseOwnership>, cadenza_ledger::LedgerError> {
        let transactions = self
            .rpc
            .transactions_by_extra_tag(LICENSE_EXTRA_TAG, from_block, to_block)
            .await?;
        let now = chrono::Utc::now().timestamp();

        let mut licenses = Vec::new();
        for tx in transactions {
            let record = match LicenseRecord::from_extra_payload(&tx.extra_payload) {
                Ok(record) => record,
                Err(e) => {
                    warn!(tx = %tx.hash, error = %e, "dropping unparseable license payload");
                    continue;
                }
            };
            if &record.buyer_key != buyer {
                continue;
            }
            let structurally_valid = match record.validate_structure(now) {
                Ok(()) => true,
                Err(e) => {
                    warn!(tx = %tx.hash, error = %e, "license record failed structural validation");
                    false
                }
            };
            let verified = structurally_valid && {
                let ok = record.verify_signature();
                if !ok {
                    warn!(tx = %tx.hash, "license record failed signature verification");
                }
                ok
            };
            licenses.push(LicenseOwnership {
                album_id: record.album_id,
                owner_key: record.buyer_key,
                purchase_amount: record.purchase_amount,
                timestamp: record.timestamp,
                tx_hash: tx.hash,
                verified,
                artist_key: record.artist_key,
            });
        }

        licenses.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        debug!(buyer = %buyer, count = licenses.len(), "license scan complete");
        Ok(licenses)
    }
}
