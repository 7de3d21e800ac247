//! Tests for the RSA keypair generation and the per-symbol wrapping used by
//! the handshake.

use cipher_chat_node::crypto::keygen::{generate_keypair, ABSOLUTE_MIN_BITS};
use cipher_chat_node::crypto::rsa::{decrypt_symbols, encrypt_symbols, from_wire, to_wire};
use cipher_chat_node::crypto::CryptoError;
use num_bigint_dig::BigUint;
use num_traits::One;

const TEST_BITS: usize = 256;

#[test]
fn test_generated_exponent_is_standard_or_fallback() {
    let keypair = generate_keypair(TEST_BITS).unwrap();
    let e = &keypair.public.e;
    assert!(
        *e == BigUint::from(65537u32) || *e == BigUint::from(3u32),
        "public exponent should be 65537 or the 3 fallback, got {}",
        e
    );
    assert!(keypair.public.n > BigUint::one());
    assert_eq!(keypair.public.n, keypair.private.n);
}

#[test]
fn test_modulus_below_hard_minimum_is_rejected() {
    let err = generate_keypair(ABSOLUTE_MIN_BITS - 1).unwrap_err();
    assert!(matches!(err, CryptoError::InvalidKey { .. }));
}

#[test]
fn test_wrap_unwrap_recovers_text() {
    let keypair = generate_keypair(TEST_BITS).unwrap();
    let text = "c2Vzc2lvbi1rZXk="; // base64-looking payload, like a real wrap

    let wrapped = encrypt_symbols(text, &keypair.public).unwrap();
    assert_eq!(wrapped.len(), text.chars().count());

    let recovered = decrypt_symbols(&wrapped, &keypair.private).unwrap();
    assert_eq!(recovered, text, "unwrap should recover the exact text");
}

#[test]
fn test_wrap_under_wrong_key_does_not_recover() {
    let kp1 = generate_keypair(TEST_BITS).unwrap();
    let kp2 = generate_keypair(TEST_BITS).unwrap();

    let wrapped = encrypt_symbols("secret", &kp1.public).unwrap();
    // Either an outright error or garbage text; never the original.
    match decrypt_symbols(&wrapped, &kp2.private) {
        Ok(text) => assert_ne!(text, "secret"),
        Err(_) => {}
    }
}

#[test]
fn test_wire_form_round_trips_as_decimal_strings() {
    let keypair = generate_keypair(TEST_BITS).unwrap();
    let wrapped = encrypt_symbols("abc", &keypair.public).unwrap();

    let wire = to_wire(&wrapped);
    assert!(wire.iter().all(|s| s.chars().all(|c| c.is_ascii_digit())));

    let back = from_wire(&wire).unwrap();
    assert_eq!(back, wrapped);
}

#[test]
fn test_malformed_wire_is_rejected() {
    let err = from_wire(&["12".to_string(), "xyz".to_string()]).unwrap_err();
    assert!(matches!(err, CryptoError::InvalidPayload { .. }));
}
