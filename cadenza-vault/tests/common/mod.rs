//! Shared fixtures: signed on-ledger licenses, catalog records,
//! serving nodes, and a wiremock signing responder for the end-to-end
//! purchase flow.

#![allow(dead_code)]

use cadenza_ledger::{MockLedger, Transaction, LICENSE_EXTRA_TAG};
use cadenza_license::LicenseRecord;
use cadenza_types::{AlbumId, PublicKey, TrackId, TxHash};
use cadenza_vault::{EncryptedContentRecord, NodeId, NodeServices, NodeStatus, ServingNode};
use ed25519_dalek::{Signer, SigningKey};
use serde_json::json;
use wiremock::{Request, Respond, ResponseTemplate};

pub fn artist_signing_key() -> SigningKey {
    SigningKey::from_bytes(&[7u8; 32])
}

pub fn artist_public(key: &SigningKey) -> PublicKey {
    PublicKey::from_bytes(key.verifying_key().to_bytes())
}

pub fn buyer() -> PublicKey {
    PublicKey::from_bytes([3; 32])
}

pub fn album(s: &str) -> AlbumId {
    AlbumId::parse(s).unwrap()
}

pub fn track(s: &str) -> TrackId {
    TrackId::parse(s).unwrap()
}

/// Builds a properly signed license record.
pub fn signed_record(
    album_name: &str,
    buyer: PublicKey,
    amount: u64,
    timestamp: i64,
    artist: &SigningKey,
) -> LicenseRecord {
    let album_id = album(album_name);
    let payload = LicenseRecord::signing_payload_for(&album_id, &buyer, amount, timestamp, 1);
    let signature = artist.sign(payload.as_bytes());
    LicenseRecord::assemble(
        album_id,
        buyer,
        amount,
        timestamp,
        artist_public(artist),
        hex::encode(signature.to_bytes()),
    )
}

/// Inserts a record into the mock ledger's transaction log.
pub async fn insert_record(ledger: &MockLedger, record: &LicenseRecord, height: u64, hash: &str) {
    ledger
        .insert_transaction(Transaction {
            hash: TxHash::new(hash),
            block_height: height,
            extra_tag: LICENSE_EXTRA_TAG,
            extra_payload: record.to_extra_payload().unwrap(),
        })
        .await;
}

/// Ledger preloaded with a verified license for [`buyer`] on the album.
pub async fn ledger_with_license(album_name: &str) -> std::sync::Arc<MockLedger> {
    let ledger = std::sync::Arc::new(MockLedger::new());
    let record = signed_record(
        album_name,
        buyer(),
        100_000,
        chrono::Utc::now().timestamp(),
        &artist_signing_key(),
    );
    insert_record(&ledger, &record, 10, "tx-license").await;
    ledger
}

/// Catalog record for one encrypted track.
pub fn content_record(
    track_name: &str,
    album_name: &str,
    swarm_locator: Option<&str>,
) -> EncryptedContentRecord {
    EncryptedContentRecord {
        track_id: track(track_name),
        album_id: album(album_name),
        locator_url: format!("https://cdn.example/{track_name}.enc"),
        content_hash: "aa".repeat(32),
        file_size: 9_400_000,
        uploaded_at: chrono::Utc::now().timestamp() - 86_400,
        seeding_nodes: vec![NodeId::new("n1")],
        swarm_locator: swarm_locator.map(String::from),
    }
}

/// An active full-service node pointing at the given endpoint.
pub fn serving_node(id: &str, endpoint: &str) -> ServingNode {
    ServingNode {
        node_id: NodeId::new(id),
        endpoint: endpoint.trim_end_matches('/').to_string(),
        stake_atomic: 800_000_000,
        status: NodeStatus::Active,
        last_seen: chrono::Utc::now().timestamp(),
        seeding_count: 3,
        trust_rating: 0.9,
        services: NodeServices {
            seeding: true,
            decryption: true,
            tracking: true,
        },
    }
}

/// Wiremock responder that behaves like a real artist signing
/// service: reads the request, reconstructs the canonical payload and
/// signs it with the artist key.
pub struct SignResponder {
    key: SigningKey,
}

impl SignResponder {
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }
}

impl Respond for SignResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: serde_json::Value = match serde_json::from_slice(&request.body) {
            Ok(v) => v,
            Err(_) => return ResponseTemplate::new(400),
        };
        let payload = format!(
            "{}:{}:{}:{}:{}",
            body["albumId"].as_str().unwrap_or_default(),
            body["buyerKey"].as_str().unwrap_or_default(),
            body["purchaseAmount"].as_u64().unwrap_or_default(),
            body["timestamp"].as_i64().unwrap_or_default(),
            body["version"].as_u64().unwrap_or_default(),
        );
        let signature = self.key.sign(payload.as_bytes());
        ResponseTemplate::new(200).set_body_json(json!({
            "signature": hex::encode(signature.to_bytes()),
            "artistKey": hex::encode(self.key.verifying_key().to_bytes()),
        }))
    }
}
