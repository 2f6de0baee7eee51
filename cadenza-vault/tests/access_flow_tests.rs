//! End-to-end flow: buy an album on the ledger, then unlock a track
//! through the access gate with the resulting license.

mod common;

use cadenza_ledger::{MemoryWallet, MockLedger, WalletSigner};
use cadenza_license::{LicenseManager, LicenseVerifier, PurchaseRequest, SigningClient};
use cadenza_paycode::PaymentCode;
use cadenza_types::{PublicKey, SecretKey};
use cadenza_vault::{ContentAccessGate, MemoryCatalog, MemorySwarm, NodeRegistry, VaultError};
use common::{
    artist_public, artist_signing_key, content_record, serving_node, track, SignResponder,
};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Stack {
    wallet: Arc<MemoryWallet>,
    manager: LicenseManager,
    catalog: Arc<MemoryCatalog>,
    registry: Arc<NodeRegistry>,
    gate: ContentAccessGate,
}

async fn stack() -> Stack {
    let ledger = Arc::new(MockLedger::new());
    let wallet = Arc::new(MemoryWallet::new(
        SecretKey::from_bytes([0x42; 32]),
        PublicKey::from_bytes([0x43; 32]),
    ));
    ledger
        .set_balance(
            &wallet.address().await.unwrap(),
            cadenza_types::Balance::coin_only(10_000_000),
        )
        .await;
    let verifier = Arc::new(LicenseVerifier::new(ledger.clone()));
    let manager = LicenseManager::new(
        ledger.clone(),
        wallet.clone(),
        SigningClient::new(None).unwrap(),
        verifier.clone(),
    );
    let catalog = Arc::new(MemoryCatalog::new());
    let registry = Arc::new(NodeRegistry::new());
    let gate = ContentAccessGate::new(
        verifier,
        catalog.clone(),
        registry.clone(),
        Arc::new(MemorySwarm::new()),
    );
    Stack {
        wallet,
        manager,
        catalog,
        registry,
        gate,
    }
}

async fn signing_service() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sign-license"))
        .respond_with(SignResponder::new(artist_signing_key()))
        .mount(&server)
        .await;
    server
}

async fn decrypt_service() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/decrypt-audio"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "decryptedUrl": "https://n1.example/stream/T1?token=xyz",
            "expiresAt": chrono::Utc::now().timestamp() + 600,
        })))
        .mount(&server)
        .await;
    server
}

fn artist_code() -> String {
    PaymentCode::new(artist_public(&artist_signing_key()), [0xcc; 32], 1, 0).encode()
}

#[tokio::test]
async fn purchase_then_unlock_through_a_serving_node() {
    let fx = stack().await;
    let signing = signing_service().await;
    let decrypting = decrypt_service().await;
    fx.catalog.insert(content_record("T1", "A1", None)).await;
    fx.registry.upsert(serving_node("n1", &decrypting.uri())).await;

    let request = PurchaseRequest::new(common::album("A1"), artist_code(), 100_000)
        .with_signing_service(signing.uri());
    let done = fx.manager.purchase_album(&request).await.unwrap();

    let buyer = fx.wallet.public_key().await.unwrap();
    let grant = fx
        .gate
        .request_decrypted_content(&track("T1"), &buyer, done.tx_hash.as_str())
        .await
        .unwrap();

    assert!(!grant.is_expired(chrono::Utc::now().timestamp()));
    assert!(grant.serving_node.is_some());
}

#[tokio::test]
async fn purchase_then_unlock_through_the_swarm() {
    let fx = stack().await;
    let signing = signing_service().await;
    fx.catalog.insert(content_record("T1", "A1", Some("loc-1"))).await;

    let request = PurchaseRequest::new(common::album("A1"), artist_code(), 100_000)
        .with_signing_service(signing.uri());
    let done = fx.manager.purchase_album(&request).await.unwrap();

    let buyer = fx.wallet.public_key().await.unwrap();
    let grant = fx
        .gate
        .request_decrypted_content(&track("T1"), &buyer, done.tx_hash.as_str())
        .await
        .unwrap();

    assert!(grant.serving_node.is_none());
    assert!(!grant.is_expired(chrono::Utc::now().timestamp()));
}

#[tokio::test]
async fn tracks_from_an_unpurchased_album_stay_locked() {
    let fx = stack().await;
    let signing = signing_service().await;
    fx.catalog.insert(content_record("T1", "A1", None)).await;
    fx.catalog.insert(content_record("T2", "A2", None)).await;

    let request = PurchaseRequest::new(common::album("A1"), artist_code(), 100_000)
        .with_signing_service(signing.uri());
    let done = fx.manager.purchase_album(&request).await.unwrap();

    let buyer = fx.wallet.public_key().await.unwrap();
    let err = fx
        .gate
        .request_decrypted_content(&track("T2"), &buyer, done.tx_hash.as_str())
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::NoValidLicense));
}
