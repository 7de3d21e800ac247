// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Symmetric Cipher Service
//!
//! Per-message encrypt/decrypt keyed by session id. The service itself is
//! stateless given a resolvable key: keys come from a hot in-memory cache
//! first, then from the injected [`SessionKeyStore`], which is how decrypt
//! keeps working after a client reload or node restart.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::aes_gcm::{decrypt_aes_gcm, encrypt_aes_gcm};
use super::error::CryptoError;
use super::session_keys::{SessionKey, SessionKeyStore};

/// The ciphertext + iv + session id triple produced by one encrypt call.
/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedEnvelope {
    /// Base64 ciphertext (tag included).
    pub ciphertext: String,
    /// Base64 12-byte IV, unique to this envelope.
    pub iv: String,
    /// Session whose key produced the envelope.
    pub session_id: String,
}

/// Session-keyed symmetric encryption front end.
pub struct CipherService {
    cache: RwLock<HashMap<String, SessionKey>>,
    store: Arc<dyn SessionKeyStore>,
}

impl CipherService {
    pub fn new(store: Arc<dyn SessionKeyStore>) -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            store,
        }
    }

    pub fn key_store(&self) -> &Arc<dyn SessionKeyStore> {
        &self.store
    }

    /// Sessions with a key loaded in the hot cache.
    pub async fn cached_sessions(&self) -> usize {
        self.cache.read().await.len()
    }

    /// Resolve the key for `session_id`: cache first, then durable store.
    async fn resolve_key(&self, session_id: &str) -> Result<SessionKey, CryptoError> {
        if let Some(key) = self.cache.read().await.get(session_id) {
            return Ok(*key);
        }

        tracing::info!(
            "🔑 Session {} not in memory, loading from key store",
            session_id
        );
        match self.store.get(session_id).await? {
            Some(key) => {
                self.cache
                    .write()
                    .await
                    .insert(session_id.to_string(), key);
                Ok(key)
            }
            None => Err(CryptoError::SessionKeyNotFound {
                session_id: session_id.to_string(),
            }),
        }
    }

    /// Encrypt `plaintext` under the session's key with a fresh IV.
    ///
    /// # Errors
    ///
    /// `SessionKeyNotFound` when no key is bound to `session_id`.
    pub async fn encrypt(
        &self,
        session_id: &str,
        plaintext: &str,
    ) -> Result<EncryptedEnvelope, CryptoError> {
        let key = self.resolve_key(session_id).await?;
        let (ciphertext, iv) = encrypt_aes_gcm(plaintext, &key)?;
        Ok(EncryptedEnvelope {
            ciphertext,
            iv,
            session_id: session_id.to_string(),
        })
    }

    /// Decrypt a ciphertext + iv pair under the session's key.
    ///
    /// # Errors
    ///
    /// `SessionKeyNotFound` when no key is bound; `TransformFailure` when
    /// the envelope is malformed or fails authentication. Callers need the
    /// distinction: the first is fixed by re-handshaking, the second is
    /// corruption.
    pub async fn decrypt(
        &self,
        session_id: &str,
        ciphertext_b64: &str,
        iv_b64: &str,
    ) -> Result<String, CryptoError> {
        let key = self.resolve_key(session_id).await?;
        decrypt_aes_gcm(ciphertext_b64, iv_b64, &key)
    }
}
