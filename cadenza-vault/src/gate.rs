//! The content access gate.
//!
//! Every playback request passes through here: the claimed license is
//! re-verified against the ledger before any serving node hears about
//! the request, and denial is reported with a single generic error so
//! callers cannot probe why verification failed.

use crate::catalog::ContentCatalog;
use crate::error::{VaultError, VaultResult};
use crate::node::{NodeId, NodeRegistry, NodeStatus, ServingNode};
use crate::swarm::SwarmFetcher;
use cadenza_license::LicenseVerifier;
use cadenza_types::{PublicKey, TrackId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Deadline for a serving node's decryption response.
pub const DECRYPTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Lifetime of a swarm-fallback handle, seconds.
pub const SWARM_HANDLE_TTL_SECS: i64 = 3600;

/// A time-boxed grant to play decrypted content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGrant {
    /// Streaming URL. Served by the granting node, or by the local
    /// swarm client on fallback.
    pub url: String,
    /// Expiry, unix seconds.
    pub expires_at: i64,
    /// The node that granted access, `None` on swarm fallback.
    pub serving_node: Option<NodeId>,
}

impl AccessGrant {
    /// Whether the grant has expired as of `now` (unix seconds).
    #[must_use]
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }
}

/// Snapshot of serving-node availability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStatus {
    /// Nodes known to the registry.
    pub total_nodes: usize,
    /// Nodes currently answering heartbeats.
    pub active_nodes: usize,
    /// Active nodes offering seeding.
    pub seeding_nodes: usize,
    /// Active nodes offering decryption.
    pub decryption_nodes: usize,
    /// Active nodes offering swarm tracking.
    pub tracking_nodes: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DecryptRequest<'a> {
    track_id: &'a TrackId,
    user_public_key: String,
    license_proof: &'a str,
    timestamp: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DecryptResponse {
    success: bool,
    decrypted_url: Option<String>,
    expires_at: Option<i64>,
    error: Option<String>,
}

/// License-gated access to encrypted content.
///
/// Holds no per-request state; share one instance behind an [`Arc`].
pub struct ContentAccessGate {
    verifier: Arc<LicenseVerifier>,
    catalog: Arc<dyn ContentCatalog>,
    registry: Arc<NodeRegistry>,
    swarm: Arc<dyn SwarmFetcher>,
    http: reqwest::Client,
}

impl ContentAccessGate {
    /// Wires the gate to its collaborators.
    #[must_use]
    pub fn new(
        verifier: Arc<LicenseVerifier>,
        catalog: Arc<dyn ContentCatalog>,
        registry: Arc<NodeRegistry>,
        swarm: Arc<dyn SwarmFetcher>,
    ) -> Self {
        Self {
            verifier,
            catalog,
            registry,
            swarm,
            http: reqwest::Client::new(),
        }
    }

    /// Requests playback access for a track.
    ///
    /// Verifies the buyer's license against the ledger first; no
    /// serving node is contacted until verification passes. With a
    /// valid license the best available node decrypts, and if no node
    /// is live the seeding swarm serves the encrypted bytes instead.
    pub async fn request_decrypted_content(
        &self,
        track: &TrackId,
        buyer: &PublicKey,
        license_proof: &str,
    ) -> VaultResult<AccessGrant> {
        let album = match self.catalog.track_album(track).await {
            Ok(Some(album)) => album,
            Ok(None) => {
                warn!(track = %track, "track has no album mapping; denying");
                return Err(VaultError::NoValidLicense);
            }
            Err(e) => {
                warn!(track = %track, error = %e, "album lookup failed; denying");
                return Err(VaultError::NoValidLicense);
            }
        };

        if !self.verifier.has_license(buyer, &album).await {
            debug!(track = %track, album = %album, "license verification failed");
            return Err(VaultError::NoValidLicense);
        }

        let record = self
            .catalog
            .encrypted_record(track)
            .await?
            .ok_or_else(|| VaultError::ContentUnavailable(format!("no record for {track}")))?;

        match self.registry.select_decryption_node().await {
            Some(node) => {
                info!(track = %track, node = %node.node_id, "requesting decryption");
                self.request_from_node(&node, track, buyer, license_proof)
                    .await
            }
            None => {
                info!(track = %track, "no serving node live; falling back to swarm");
                let locator = record.swarm_locator.as_deref().ok_or_else(|| {
                    VaultError::NodeUnavailable(format!(
                        "no serving node and no swarm locator for {track}"
                    ))
                })?;
                let handle = self.swarm.fetch(locator).await?;
                Ok(AccessGrant {
                    url: handle.local_url,
                    expires_at: chrono::Utc::now().timestamp() + SWARM_HANDLE_TTL_SECS,
                    serving_node: None,
                })
            }
        }
    }

    /// Counts registry nodes by liveness and offered services.
    pub async fn network_status(&self) -> NetworkStatus {
        let nodes = self.registry.snapshot().await;
        let mut status = NetworkStatus {
            total_nodes: nodes.len(),
            ..NetworkStatus::default()
        };
        for node in &nodes {
            if node.status != NodeStatus::Active {
                continue;
            }
            status.active_nodes += 1;
            if node.services.seeding {
                status.seeding_nodes += 1;
            }
            if node.services.decryption {
                status.decryption_nodes += 1;
            }
            if node.services.tracking {
                status.tracking_nodes += 1;
            }
        }
        status
    }

    async fn request_from_node(
        &self,
        node: &ServingNode,
        track: &TrackId,
        buyer: &PublicKey,
        license_proof: &str,
    ) -> VaultResult<AccessGrant> {
        let url = format!("{}/decrypt-audio", node.endpoint);
        let body = DecryptRequest {
            track_id: track,
            user_public_key: buyer.to_hex(),
            license_proof,
            timestamp: chrono::Utc::now().timestamp(),
        };

        let response = self
            .http
            .post(&url)
            .timeout(DECRYPTION_TIMEOUT)
            .bearer_auth(license_proof)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    VaultError::Timeout(format!("node {} decryption request", node.node_id))
                } else {
                    VaultError::Decryption(format!("node {} unreachable: {e}", node.node_id))
                }
            })?;

        if !response.status().is_success() {
            return Err(VaultError::Decryption(format!(
                "node {} returned {}",
                node.node_id,
                response.status()
            )));
        }

        let decrypted: DecryptResponse = response.json().await.map_err(|e| {
            VaultError::Decryption(format!("node {} sent a malformed response: {e}", node.node_id))
        })?;

        if !decrypted.success {
            let detail = decrypted.error.unwrap_or_else(|| "unspecified".into());
            return Err(VaultError::Decryption(format!(
                "node {} refused: {detail}",
                node.node_id
            )));
        }
        let url = decrypted.decrypted_url.ok_or_else(|| {
            VaultError::Decryption(format!("node {} omitted the decrypted url", node.node_id))
        })?;

        Ok(AccessGrant {
            url,
            expires_at: decrypted
                .expires_at
                .unwrap_or_else(|| chrono::Utc::now().timestamp() + SWARM_HANDLE_TTL_SECS),
            serving_node: Some(node.node_id.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_expiry_is_inclusive_of_deadline() {
        let grant = AccessGrant {
            url: "http://n1.example/stream/t".into(),
            expires_at: 1_000,
            serving_node: None,
        };
        assert!(!grant.is_expired(999));
        assert!(grant.is_expired(1_000));
        assert!(grant.is_expired(1_001));
    }
}
