// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Key Exchange Coordinator
//!
//! Orchestrates the handshake that provisions a session's symmetric key
//! without ever sending it in the clear:
//!
//! ```text
//! AwaitingPublicKey ── client sends (session_id, identity_ref, n, e) ──▶
//! KeyIssued ── node wraps the session key under (n, e), stores raw key ──▶
//! Bound ── client unwraps with d, holds the key in memory
//! ```
//!
//! The states are encoded in types: [`ClientHandshake::begin`] produces a
//! [`PendingHandshake`] holding the private half, and only
//! [`PendingHandshake::bind`] can turn a node response into a usable key.
//! An abandoned handshake never reaches `Bound` and therefore can never be
//! used for encrypt/decrypt.
//!
//! Only the public exponent and modulus cross the wire toward the node, so
//! this leg needs no transport confidentiality.

use num_bigint_dig::BigUint;
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};

use super::error::CryptoError;
use super::keygen::{generate_keypair, RsaKeypair, RsaPublicKey};
use super::rsa;
use super::session_keys::{SessionKey, SessionKeyStore};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// What the node does when a handshake arrives for a session that already
/// holds a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RekeyPolicy {
    /// Re-issue the existing key wrapped under the new public key. The
    /// handshake is idempotent; a reloaded client regains its key without
    /// invalidating stored ciphertexts. This is the default.
    RewrapExisting,
    /// Fail with `SessionAlreadyBound`; callers are expected to check for an
    /// existing key and skip the handshake.
    RejectIfBound,
}

impl Default for RekeyPolicy {
    fn default() -> Self {
        RekeyPolicy::RewrapExisting
    }
}

/// Node response to a handshake: the session key wrapped under the client's
/// public key, as decimal integer strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedKey {
    pub session_id: String,
    pub encrypted_session_key: Vec<String>,
}

/// Parse the `[n, e]` wire form of a client public key.
pub fn parse_public_key(n: &str, e: &str) -> Result<RsaPublicKey, CryptoError> {
    let parse = |name: &str, s: &str| {
        BigUint::parse_bytes(s.as_bytes(), 10).ok_or_else(|| CryptoError::InvalidPayload {
            field: format!("public_key.{}", name),
            reason: format!("'{}' is not a decimal integer", s),
        })
    };
    Ok(RsaPublicKey {
        n: parse("n", n)?,
        e: parse("e", e)?,
    })
}

/// Node half of the handshake.
///
/// Looks up the session's key (generating a fresh random one when absent),
/// persists the raw key in the store, and returns the key's base64 text
/// wrapped symbol-by-symbol under the client's public key.
pub async fn issue_session_key(
    store: &dyn SessionKeyStore,
    session_id: &str,
    identity_ref: &str,
    client_public: &RsaPublicKey,
    policy: RekeyPolicy,
) -> Result<IssuedKey, CryptoError> {
    let key = match store.get(session_id).await? {
        Some(existing) => match policy {
            RekeyPolicy::RewrapExisting => {
                tracing::info!("🔁 Re-wrapping existing key for session: {}", session_id);
                existing
            }
            RekeyPolicy::RejectIfBound => {
                return Err(CryptoError::SessionAlreadyBound {
                    session_id: session_id.to_string(),
                })
            }
        },
        None => {
            let mut key = [0u8; 32];
            OsRng.fill_bytes(&mut key);
            tracing::info!("🔑 Generated AES-256 session key for session: {}", session_id);
            key
        }
    };

    let key_b64 = BASE64.encode(key);
    let wrapped = rsa::encrypt_symbols(&key_b64, client_public)?;

    // The raw key is persisted, never its wrapped form; the wrapped form is
    // only meaningful to the client that holds the private exponent.
    store.put(session_id, identity_ref, key).await?;

    Ok(IssuedKey {
        session_id: session_id.to_string(),
        encrypted_session_key: rsa::to_wire(&wrapped),
    })
}

/// Client half of the handshake, before the node has answered.
///
/// Holds the private key for exactly one exchange; consumed by [`bind`].
///
/// [`bind`]: PendingHandshake::bind
pub struct PendingHandshake {
    session_id: String,
    keypair: RsaKeypair,
}

/// Entry point for the client half.
pub struct ClientHandshake;

impl ClientHandshake {
    /// Generate an ephemeral keypair for `session_id`.
    ///
    /// Returns the wire form of the public half plus the pending state.
    pub fn begin(
        session_id: &str,
        modulus_bits: usize,
    ) -> Result<(PublicKeyWire, PendingHandshake), CryptoError> {
        let keypair = generate_keypair(modulus_bits)?;
        let wire = PublicKeyWire {
            n: keypair.public.n.to_str_radix(10),
            e: keypair.public.e.to_str_radix(10),
        };
        Ok((
            wire,
            PendingHandshake {
                session_id: session_id.to_string(),
                keypair,
            },
        ))
    }
}

/// Public key halves as decimal strings, ready for JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicKeyWire {
    pub n: String,
    pub e: String,
}

/// A session key recovered by a completed handshake. Lives in client memory
/// only.
#[derive(Debug)]
pub struct BoundSession {
    pub session_id: String,
    pub key: SessionKey,
}

impl PendingHandshake {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Unwrap the node's response into the raw session key, consuming the
    /// private half.
    ///
    /// # Errors
    ///
    /// `CryptoError::InvalidPayload` for a session id mismatch or malformed
    /// integers; `CryptoError::TransformFailure` when the unwrapped text is
    /// not a base64 32-byte key (wrong keypair or corrupted response).
    pub fn bind(self, issued: &IssuedKey) -> Result<BoundSession, CryptoError> {
        if issued.session_id != self.session_id {
            return Err(CryptoError::InvalidPayload {
                field: "session_id".to_string(),
                reason: format!(
                    "response for session '{}' does not match handshake for '{}'",
                    issued.session_id, self.session_id
                ),
            });
        }

        let wrapped = rsa::from_wire(&issued.encrypted_session_key)?;
        let key_b64 = rsa::decrypt_symbols(&wrapped, &self.keypair.private)?;

        let bytes = BASE64.decode(&key_b64).map_err(|e| {
            CryptoError::transform("handshake_bind", format!("unwrapped key base64: {}", e))
        })?;
        let key: SessionKey = bytes.try_into().map_err(|_| {
            CryptoError::transform("handshake_bind", "unwrapped key is not 32 bytes")
        })?;

        Ok(BoundSession {
            session_id: self.session_id,
            key,
        })
    }
}
