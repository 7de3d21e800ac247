// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Database handle over SQLite via sqlx.

use std::path::Path;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use super::StoreError;
use crate::transform::{AttachmentTransform, IdentityTransform};

/// Central store handle. Cheap to clone (Arc/pool internally).
#[derive(Clone)]
pub struct Store {
    pub pool: SqlitePool,
    pub(crate) transform: Arc<dyn AttachmentTransform>,
}

impl Store {
    /// Open (or create) the SQLite database at `db_path`.
    ///
    /// WAL journal mode and foreign-key enforcement are configured at
    /// connection time; cascading deletes from chats to messages depend on
    /// the foreign_keys pragma being on.
    pub async fn open(db_path: &Path) -> Result<Self, StoreError> {
        let opts = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePool::connect_with(opts).await?;
        let store = Self {
            pool,
            transform: Arc::new(IdentityTransform),
        };
        store.create_tables().await?;
        tracing::info!("🗄️  Chat store opened at {}", db_path.display());
        Ok(store)
    }

    /// In-memory database for tests. A single connection keeps every query
    /// on the same ephemeral database.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let opts = SqliteConnectOptions::new()
            .filename(":memory:")
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await?;
        let store = Self {
            pool,
            transform: Arc::new(IdentityTransform),
        };
        store.create_tables().await?;
        Ok(store)
    }

    /// Replace the attachment transform applied ahead of the persistence
    /// gate.
    pub fn with_transform(mut self, transform: Arc<dyn AttachmentTransform>) -> Self {
        self.transform = transform;
        self
    }

    async fn create_tables(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS chats (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                encrypted INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS messages (
                id TEXT PRIMARY KEY,
                chat_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                role TEXT NOT NULL,
                content TEXT,
                encrypted_data TEXT,
                iv TEXT,
                session_id TEXT,
                attachment BLOB,
                created_at TEXT NOT NULL,
                FOREIGN KEY (chat_id) REFERENCES chats(id) ON DELETE CASCADE
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
