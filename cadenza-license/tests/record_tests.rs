mod common;

use cadenza_license::LicenseRecord;
use cadenza_types::PublicKey;
use common::{artist_signing_key, signed_record};

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[test]
fn properly_signed_record_verifies() {
    let record = signed_record("A1", PublicKey::from_bytes([3; 32]), 100_000, now(), &artist_signing_key());
    assert!(record.verify_signature());
    assert!(record.validate_structure(now()).is_ok());
}

#[test]
fn tampered_amount_fails_verification() {
    let mut record =
        signed_record("A1", PublicKey::from_bytes([3; 32]), 100_000, now(), &artist_signing_key());
    record.purchase_amount = 1;
    // Still parses structurally, but the signature no longer covers it.
    assert!(record.validate_structure(now()).is_ok());
    assert!(!record.verify_signature());
}

#[test]
fn tampered_album_fails_verification() {
    let mut record =
        signed_record("A1", PublicKey::from_bytes([3; 32]), 100_000, now(), &artist_signing_key());
    record.album_id = cadenza_types::AlbumId::parse("A2").unwrap();
    assert!(!record.verify_signature());
}

#[test]
fn foreign_artist_key_fails_verification() {
    let mut record =
        signed_record("A1", PublicKey::from_bytes([3; 32]), 100_000, now(), &artist_signing_key());
    let other = ed25519_dalek::SigningKey::from_bytes(&[9u8; 32]);
    record.artist_key = PublicKey::from_bytes(other.verifying_key().to_bytes());
    assert!(!record.verify_signature());
}

#[test]
fn wire_round_trip_preserves_signature_validity() {
    let record = signed_record("midnight-sessions", PublicKey::from_bytes([4; 32]), 250_000, now(), &artist_signing_key());
    let parsed = LicenseRecord::from_extra_payload(&record.to_extra_payload().unwrap()).unwrap();
    assert!(parsed.verify_signature());
}
