use cadenza_paycode::{
    derive_multiple_addresses, derive_payment_address, notification_address,
    validate_derived_address, PaycodeError, PaymentCode,
};
use cadenza_types::{PublicKey, SecretKey, ADDRESS_PREFIX};
use std::collections::HashSet;

fn artist_code() -> String {
    PaymentCode::new(PublicKey::from_bytes([0xaa; 32]), [0xcc; 32], 1, 0).encode()
}

fn buyer_secret() -> SecretKey {
    SecretKey::from_bytes([0x42; 32])
}

// ── determinism & uniqueness ─────────────────────────────────────

#[test]
fn derivation_is_deterministic() {
    let code = artist_code();
    let secret = buyer_secret();
    let a = derive_payment_address(&code, &secret, 3).unwrap();
    let b = derive_payment_address(&code, &secret, 3).unwrap();
    assert_eq!(a, b);
}

#[test]
fn distinct_indices_yield_distinct_addresses() {
    let code = artist_code();
    let secret = buyer_secret();
    let mut seen = HashSet::new();
    for index in 0..100 {
        let addr = derive_payment_address(&code, &secret, index).unwrap();
        assert!(seen.insert(addr), "collision at index {index}");
    }
}

#[test]
fn distinct_buyers_yield_distinct_addresses() {
    let code = artist_code();
    let a = derive_payment_address(&code, &SecretKey::from_bytes([1; 32]), 0).unwrap();
    let b = derive_payment_address(&code, &SecretKey::from_bytes([2; 32]), 0).unwrap();
    assert_ne!(a, b);
}

#[test]
fn derived_address_has_ledger_prefix() {
    let addr = derive_payment_address(&artist_code(), &buyer_secret(), 0).unwrap();
    assert!(addr.as_str().starts_with(ADDRESS_PREFIX));
}

// ── failure modes ────────────────────────────────────────────────

#[test]
fn invalid_code_fails_before_derivation() {
    let hundred_chars = format!("PC{}", "0".repeat(98));
    let err = derive_payment_address(&hundred_chars, &buyer_secret(), 0).unwrap_err();
    assert!(matches!(err, PaycodeError::InvalidCode(_)));
}

#[test]
fn zero_secret_is_a_derivation_failure() {
    let err =
        derive_payment_address(&artist_code(), &SecretKey::from_bytes([0; 32]), 0).unwrap_err();
    assert!(matches!(err, PaycodeError::Derivation(_)));
}

// ── batch & validation ───────────────────────────────────────────

#[test]
fn batch_derivation_covers_requested_indices() {
    let derived = derive_multiple_addresses(&artist_code(), &buyer_secret(), 5).unwrap();
    assert_eq!(derived.len(), 5);
    for (i, d) in derived.iter().enumerate() {
        assert_eq!(d.index, i as u32);
        assert_eq!(
            d.address,
            derive_payment_address(&artist_code(), &buyer_secret(), i as u32).unwrap()
        );
    }
}

#[test]
fn batch_shares_one_secret_across_indices() {
    let derived = derive_multiple_addresses(&artist_code(), &buyer_secret(), 3).unwrap();
    assert_eq!(derived[0].shared_secret, derived[1].shared_secret);
    assert_eq!(derived[1].shared_secret, derived[2].shared_secret);
}

#[test]
fn validate_finds_the_right_index() {
    let code = artist_code();
    let secret = buyer_secret();
    let addr = derive_payment_address(&code, &secret, 7).unwrap();
    let found = validate_derived_address(&addr, &code, &secret, 100).unwrap();
    assert_eq!(found, Some(7));
}

#[test]
fn validate_misses_foreign_address() {
    let code = artist_code();
    let foreign = derive_payment_address(&code, &SecretKey::from_bytes([9; 32]), 0).unwrap();
    let found = validate_derived_address(&foreign, &code, &buyer_secret(), 100).unwrap();
    assert_eq!(found, None);
}

#[test]
fn validate_respects_max_index() {
    let code = artist_code();
    let secret = buyer_secret();
    let addr = derive_payment_address(&code, &secret, 50).unwrap();
    assert_eq!(validate_derived_address(&addr, &code, &secret, 10).unwrap(), None);
}

// ── notification address ─────────────────────────────────────────

#[test]
fn notification_address_is_deterministic_per_buyer() {
    let code = artist_code();
    let buyer = PublicKey::from_bytes([0x77; 32]);
    let a = notification_address(&code, &buyer).unwrap();
    let b = notification_address(&code, &buyer).unwrap();
    assert_eq!(a, b);

    let other = notification_address(&code, &PublicKey::from_bytes([0x78; 32])).unwrap();
    assert_ne!(a, other);
}
