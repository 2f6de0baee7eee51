//! Shared fixtures: deterministic artist keys, signed records, and a
//! wiremock responder that plays an artist signing service.

#![allow(dead_code)]

use cadenza_ledger::{MockLedger, Transaction, LICENSE_EXTRA_TAG};
use cadenza_license::LicenseRecord;
use cadenza_types::{AlbumId, PublicKey, TxHash};
use ed25519_dalek::{Signer, SigningKey};
use serde_json::json;
use wiremock::{Request, Respond, ResponseTemplate};

/// A fixed artist signing key so fixtures are reproducible.
pub fn artist_signing_key() -> SigningKey {
    SigningKey::from_bytes(&[7u8; 32])
}

pub fn artist_public(key: &SigningKey) -> PublicKey {
    PublicKey::from_bytes(key.verifying_key().to_bytes())
}

/// Builds a properly signed license record.
pub fn signed_record(
    album: &str,
    buyer: PublicKey,
    amount: u64,
    timestamp: i64,
    artist: &SigningKey,
) -> LicenseRecord {
    let album_id = AlbumId::parse(album).unwrap();
    let payload =
        LicenseRecord::signing_payload_for(&album_id, &buyer, amount, timestamp, 1);
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
