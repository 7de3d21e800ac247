// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Crypto Error Types
//!
//! Typed failures for the key exchange and message encryption paths. The
//! variants callers branch on:
//!
//! - **SessionKeyNotFound**: no key is bound to the session id. Recoverable
//!   by re-running the handshake.
//! - **SessionAlreadyBound**: a handshake was attempted under
//!   [`RekeyPolicy::RejectIfBound`](crate::crypto::RekeyPolicy) for a session
//!   that already holds a key.
//! - **TransformFailure**: ciphertext, IV, or encrypted key material is
//!   malformed or fails authentication. Treated as corruption;
//!   non-recoverable for that message.
//! - **InvalidKey** / **InvalidPayload**: key material or wire fields failed
//!   validation before any transform ran.
//!
//! The SessionKeyNotFound / TransformFailure split matters for display code:
//! the first means "re-handshake", the second means "this data is corrupt".

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    /// No session key is bound to the given session id, in memory or in the
    /// durable store.
    #[error("session key not found for session_id: {session_id}")]
    SessionKeyNotFound { session_id: String },

    /// A key is already bound and the caller asked for a fresh handshake to
    /// be rejected in that case.
    #[error("session {session_id} already has a bound key")]
    SessionAlreadyBound { session_id: String },

    /// A cryptographic transform failed: authentication tag mismatch,
    /// undecodable ciphertext/IV, or a symbol outside the keypair's range.
    #[error("transform failure during {operation}: {reason}")]
    TransformFailure { operation: String, reason: String },

    /// Key material failed validation (wrong size, modulus too small, not
    /// invertible).
    #[error("invalid key ({key_type}): {reason}")]
    InvalidKey { key_type: String, reason: String },

    /// A wire field failed validation before any transform ran.
    #[error("invalid payload field '{field}': {reason}")]
    InvalidPayload { field: String, reason: String },

    /// Durable key store failure (SQLite error underneath).
    #[error("session key store error: {0}")]
    Store(#[from] sqlx::Error),
}

impl CryptoError {
    pub fn transform(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        CryptoError::TransformFailure {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}
