// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-Symbol RSA Transform
//!
//! Textbook, unpadded RSA applied to each Unicode code point of a short
//! string independently: `c_i = m_i ^ e mod n`. On the wire the integers
//! travel as a JSON array of decimal strings.
//!
//! This construction is deterministic per symbol and has no semantic
//! security. It exists for exactly one purpose: wrapping the short random
//! session key during the handshake. Message content goes through
//! [`crate::crypto::aes_gcm`], never through this transform.

use num_bigint_dig::BigUint;
use num_traits::ToPrimitive;

use super::error::CryptoError;
use super::keygen::{RsaPrivateKey, RsaPublicKey};
use super::modmath::mod_pow;

/// Encrypt each code point of `text` under the public key.
///
/// # Errors
///
/// `CryptoError::InvalidKey` when a code point is not smaller than the
/// modulus (the modulus is too small to carry the symbol).
pub fn encrypt_symbols(text: &str, public: &RsaPublicKey) -> Result<Vec<BigUint>, CryptoError> {
    text.chars()
        .map(|c| {
            let m = BigUint::from(c as u32);
            if m >= public.n {
                return Err(CryptoError::InvalidKey {
                    key_type: "rsa_modulus".to_string(),
                    reason: format!("modulus too small for code point U+{:04X}", c as u32),
                });
            }
            Ok(mod_pow(&m, &public.e, &public.n))
        })
        .collect()
}

/// Decrypt a symbol sequence with the private key and reassemble the string.
///
/// # Errors
///
/// `CryptoError::TransformFailure` when a decrypted value is not a valid
/// Unicode code point, meaning a wrong private key or corrupted integers.
pub fn decrypt_symbols(
    symbols: &[BigUint],
    private: &RsaPrivateKey,
) -> Result<String, CryptoError> {
    symbols
        .iter()
        .map(|c| {
            let m = mod_pow(c, &private.d, &private.n);
            let code = m.to_u32().ok_or_else(|| {
                CryptoError::transform("rsa_decrypt", "decrypted value exceeds u32 range")
            })?;
            char::from_u32(code).ok_or_else(|| {
                CryptoError::transform(
                    "rsa_decrypt",
                    format!("value {} is not a valid code point", code),
                )
            })
        })
        .collect()
}

/// Serialize encrypted symbols to their decimal wire form.
pub fn to_wire(symbols: &[BigUint]) -> Vec<String> {
    symbols.iter().map(|s| s.to_str_radix(10)).collect()
}

/// Parse the decimal wire form back into integers.
pub fn from_wire(wire: &[String]) -> Result<Vec<BigUint>, CryptoError> {
    wire.iter()
        .map(|s| {
            BigUint::parse_bytes(s.as_bytes(), 10).ok_or_else(|| CryptoError::InvalidPayload {
                field: "encrypted_session_key".to_string(),
                reason: format!("'{}' is not a decimal integer", s),
            })
        })
        .collect()
}
