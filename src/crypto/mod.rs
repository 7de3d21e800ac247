// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Session Encryption Module
//!
//! This module implements the cryptographic core of the node: a public-key
//! handshake that provisions one symmetric key per chat session, and the
//! AES-256-GCM message encryption keyed by that session.
//!
//! ## Protocol Flow
//!
//! 1. Client generates an ephemeral RSA keypair and sends only the public
//!    half (modulus + exponent) together with the session id
//! 2. Node generates a random 32-byte session key (or re-wraps the existing
//!    one, see [`RekeyPolicy`]) and encrypts its base64 form symbol-by-symbol
//!    under the client's public key
//! 3. Node stores the raw session key in the [`SessionKeyStore`], keyed by
//!    session id, so encrypt/decrypt survive client reloads
//! 4. Client decrypts with its private exponent and holds the key in memory
//! 5. All messages for the session are encrypted with AES-256-GCM using a
//!    fresh random IV per call
//!
//! ## Security Considerations
//!
//! - The per-symbol RSA transform is unpadded and deterministic; it only
//!   ever carries the short random session key, never message content
//! - The private half of the handshake keypair never leaves the client and
//!   is dropped when the handshake completes
//! - IVs are drawn from the OS RNG on every encrypt call; reuse is
//!   prevented by construction

pub mod aes_gcm;
pub mod cipher;
pub mod error;
pub mod key_exchange;
pub mod keygen;
pub mod modmath;
pub mod rsa;
pub mod session_keys;

pub use aes_gcm::{decrypt_aes_gcm, encrypt_aes_gcm};
pub use cipher::{CipherService, EncryptedEnvelope};
pub use error::CryptoError;
pub use key_exchange::{
    issue_session_key, parse_public_key, BoundSession, ClientHandshake, IssuedKey,
    PendingHandshake, PublicKeyWire, RekeyPolicy,
};
pub use keygen::{generate_keypair, RsaKeypair, RsaPrivateKey, RsaPublicKey};
pub use session_keys::{MemoryKeyStore, SessionKey, SessionKeyStore, SqliteKeyStore};
