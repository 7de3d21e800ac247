// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Session Key Storage
//!
//! One symmetric key per session id, most-recent-write-wins. The store is an
//! injected abstraction with two implementations:
//!
//! - [`MemoryKeyStore`]: RwLock-guarded map; tests and the node's hot cache
//! - [`SqliteKeyStore`]: durable rows, so decrypt keeps working after the
//!   client's in-memory key is lost (page reload, process restart)
//!
//! No expiry policy exists: keys persist for the lifetime of the owning chat
//! and are only removed with it. Rotation is deliberately not implemented.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sqlx::SqlitePool;
use tokio::sync::RwLock;

use super::error::CryptoError;

/// Raw 32-byte symmetric session key.
pub type SessionKey = [u8; 32];

/// Durable, session-id-keyed storage of symmetric keys.
#[async_trait]
pub trait SessionKeyStore: Send + Sync {
    /// Bind `key` to `session_id`, overwriting any previous key.
    async fn put(
        &self,
        session_id: &str,
        identity_ref: &str,
        key: SessionKey,
    ) -> Result<(), CryptoError>;

    /// Fetch the key bound to `session_id`, if any.
    async fn get(&self, session_id: &str) -> Result<Option<SessionKey>, CryptoError>;

    /// Number of sessions currently holding a key.
    async fn count(&self) -> Result<usize, CryptoError>;
}

/// In-memory session key store.
///
/// Thread-safe and cheap to clone; concurrent sessions do not contend beyond
/// the map lock.
#[derive(Clone, Default)]
pub struct MemoryKeyStore {
    keys: Arc<RwLock<HashMap<String, SessionKey>>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionKeyStore for MemoryKeyStore {
    async fn put(
        &self,
        session_id: &str,
        _identity_ref: &str,
        key: SessionKey,
    ) -> Result<(), CryptoError> {
        let mut keys = self.keys.write().await;
        keys.insert(session_id.to_string(), key);
        tracing::info!(
            "🔑 Session key stored for session: {} (total keys: {})",
            session_id,
            keys.len()
        );
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Option<SessionKey>, CryptoError> {
        Ok(self.keys.read().await.get(session_id).copied())
    }

    async fn count(&self) -> Result<usize, CryptoError> {
        Ok(self.keys.read().await.len())
    }
}

/// SQLite-backed session key store.
///
/// Rows live in the `sessions` table; writes are atomic upserts keyed by
/// session id, so concurrent handshakes for different sessions never
/// interfere and a repeated handshake for the same session simply replaces
/// the row.
#[derive(Clone)]
pub struct SqliteKeyStore {
    pool: SqlitePool,
}

impl SqliteKeyStore {
    /// Wrap a pool, creating the `sessions` table when missing.
    pub async fn new(pool: SqlitePool) -> Result<Self, CryptoError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                key_b64 TEXT NOT NULL,
                algorithm TEXT NOT NULL DEFAULT 'AES-256-GCM',
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
        )
        .execute(&pool)
        .await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl SessionKeyStore for SqliteKeyStore {
    async fn put(
        &self,
        session_id: &str,
        identity_ref: &str,
        key: SessionKey,
    ) -> Result<(), CryptoError> {
        sqlx::query(
            "INSERT INTO sessions (id, user_id, key_b64, created_at)
             VALUES (?, ?, ?, datetime('now'))
             ON CONFLICT(id) DO UPDATE SET
                user_id = excluded.user_id,
                key_b64 = excluded.key_b64,
                created_at = excluded.created_at",
        )
        .bind(session_id)
        .bind(identity_ref)
        .bind(BASE64.encode(key))
        .execute(&self.pool)
        .await?;
        tracing::info!("💾 Session key persisted for session: {}", session_id);
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Option<SessionKey>, CryptoError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT key_b64 FROM sessions WHERE id = ?")
                .bind(session_id)
                .fetch_optional(&self.pool)
                .await?;

        let Some((key_b64,)) = row else {
            return Ok(None);
        };

        let bytes = BASE64
            .decode(&key_b64)
            .map_err(|e| CryptoError::InvalidKey {
                key_type: "stored_session_key".to_string(),
                reason: format!("base64 decode: {}", e),
            })?;
        let key: SessionKey = bytes.try_into().map_err(|_| CryptoError::InvalidKey {
            key_type: "stored_session_key".to_string(),
            reason: "stored key is not 32 bytes".to_string(),
        })?;
        Ok(Some(key))
    }

    async fn count(&self) -> Result<usize, CryptoError> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sessions")
            .fetch_one(&self.pool)
            .await?;
        Ok(n as usize)
    }
}
