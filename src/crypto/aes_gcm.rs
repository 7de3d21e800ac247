// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! AES-256-GCM Message Encryption
//!
//! The symmetric primitive behind every per-message encrypt/decrypt. The
//! envelope carries ciphertext and IV separately, both base64-encoded:
//!
//! ```text
//! { ciphertext: base64(ct + tag), iv: base64(12 bytes) }
//! ```
//!
//! - IV: 12 bytes (96 bits), drawn fresh from the OS RNG on every encrypt
//!   call, never caller-supplied, so reuse cannot happen by construction
//! - Tag: 16-byte authentication tag appended to the ciphertext
//! - No Additional Authenticated Data

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::{rngs::OsRng, RngCore};

use super::error::CryptoError;

/// IV size for AES-GCM (96 bits).
pub const IV_LEN: usize = 12;

/// Encrypt `plaintext` under a 32-byte session key.
///
/// Returns `(ciphertext_b64, iv_b64)`. A fresh random IV is generated per
/// call; two calls with identical inputs produce different ciphertexts.
pub fn encrypt_aes_gcm(plaintext: &str, key: &[u8; 32]) -> Result<(String, String), CryptoError> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|e| CryptoError::InvalidKey {
        key_type: "session_key".to_string(),
        reason: e.to_string(),
    })?;

    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);
    let nonce = Nonce::from_slice(&iv);

    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|e| CryptoError::transform("encrypt", e.to_string()))?;

    Ok((BASE64.encode(ciphertext), BASE64.encode(iv)))
}

/// Decrypt a base64 ciphertext + IV pair under a 32-byte session key.
///
/// # Errors
///
/// `CryptoError::TransformFailure` when the base64 is undecodable, the IV
/// has the wrong size, the authentication tag does not verify (wrong key or
/// tampered data), or the plaintext is not UTF-8.
pub fn decrypt_aes_gcm(
    ciphertext_b64: &str,
    iv_b64: &str,
    key: &[u8; 32],
) -> Result<String, CryptoError> {
    let ciphertext = BASE64
        .decode(ciphertext_b64)
        .map_err(|e| CryptoError::transform("decrypt", format!("ciphertext base64: {}", e)))?;
    let iv = BASE64
        .decode(iv_b64)
        .map_err(|e| CryptoError::transform("decrypt", format!("iv base64: {}", e)))?;

    if iv.len() != IV_LEN {
        return Err(CryptoError::transform(
            "decrypt",
            format!("invalid iv size: expected {} bytes, got {}", IV_LEN, iv.len()),
        ));
    }

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|e| CryptoError::InvalidKey {
        key_type: "session_key".to_string(),
        reason: e.to_string(),
    })?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(&iv), ciphertext.as_ref())
        .map_err(|_| {
            CryptoError::transform(
                "decrypt",
                "authentication failed: wrong key or corrupted data",
            )
        })?;

    String::from_utf8(plaintext)
        .map_err(|e| CryptoError::transform("decrypt", format!("plaintext not UTF-8: {}", e)))
}
