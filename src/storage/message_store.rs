// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Secure Message Persistence Gate
//!
//! Every message write goes through [`Store::store_message`], which enforces
//! the central invariant of the node: a chat flagged encrypted never has
//! plaintext in its durable rows, and a plaintext chat never has envelope
//! columns set. The gate does no cryptography; it validates and normalizes
//! what callers hand it, then writes.
//!
//! The same invariant is re-asserted on read: [`Store::list_messages`] nulls
//! any plaintext column before returning rows of an encrypted chat.

use chrono::Utc;
use uuid::Uuid;

use super::db::Store;
use super::models::{ChatRow, MessageRow, Role};
use super::StoreError;

/// Inbound message payload, before the gate has normalized it.
#[derive(Debug, Clone, Default)]
pub struct NewMessage {
    pub role: Option<Role>,
    pub content: Option<String>,
    pub ciphertext: Option<String>,
    pub iv: Option<String>,
    pub session_id: Option<String>,
    pub attachment: Option<Vec<u8>>,
}

impl Store {
    /// Create a chat owned by `identity_ref`.
    pub async fn create_chat(
        &self,
        identity_ref: &str,
        title: &str,
        encrypted: bool,
    ) -> Result<ChatRow, StoreError> {
        let now = Utc::now();
        let chat = ChatRow {
            id: Uuid::new_v4().to_string(),
            user_id: identity_ref.to_string(),
            title: title.to_string(),
            encrypted,
            created_at: now,
            updated_at: now,
        };
        sqlx::query(
            "INSERT INTO chats (id, user_id, title, encrypted, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&chat.id)
        .bind(&chat.user_id)
        .bind(&chat.title)
        .bind(chat.encrypted)
        .bind(chat.created_at)
        .bind(chat.updated_at)
        .execute(&self.pool)
        .await?;

        tracing::info!(
            "💬 Chat created: {} (encrypted: {})",
            chat.id,
            chat.encrypted
        );
        Ok(chat)
    }

    /// Fetch a chat and verify ownership.
    pub async fn get_chat(&self, chat_id: &str, identity_ref: &str) -> Result<ChatRow, StoreError> {
        let chat: Option<ChatRow> = sqlx::query_as("SELECT * FROM chats WHERE id = ?")
            .bind(chat_id)
            .fetch_optional(&self.pool)
            .await?;

        let chat = chat.ok_or_else(|| StoreError::ChatNotFound {
            chat_id: chat_id.to_string(),
        })?;
        if chat.user_id != identity_ref {
            return Err(StoreError::Unauthorized {
                chat_id: chat_id.to_string(),
            });
        }
        Ok(chat)
    }

    /// Delete a chat; messages cascade with it.
    pub async fn delete_chat(&self, chat_id: &str, identity_ref: &str) -> Result<(), StoreError> {
        self.get_chat(chat_id, identity_ref).await?;
        sqlx::query("DELETE FROM chats WHERE id = ?")
            .bind(chat_id)
            .execute(&self.pool)
            .await?;
        tracing::info!("🗑️  Chat deleted (messages cascaded): {}", chat_id);
        Ok(())
    }

    /// Persist a message through the mutual-exclusivity gate.
    ///
    /// For an encrypted chat the stored plaintext is forced NULL regardless
    /// of what was supplied, and a complete envelope (ciphertext + iv +
    /// session id) is required. For a plaintext chat the envelope columns
    /// are forced NULL.
    ///
    /// # Errors
    ///
    /// `ChatNotFound` / `Unauthorized` from the ownership check;
    /// `MissingCiphertext` when an encrypted chat is given no envelope.
    pub async fn store_message(
        &self,
        chat_id: &str,
        identity_ref: &str,
        message: NewMessage,
    ) -> Result<MessageRow, StoreError> {
        let chat = self.get_chat(chat_id, identity_ref).await?;

        let (content, ciphertext, iv, session_id) = if chat.encrypted {
            let (Some(ct), Some(iv), Some(sid)) =
                (message.ciphertext, message.iv, message.session_id)
            else {
                return Err(StoreError::MissingCiphertext {
                    chat_id: chat_id.to_string(),
                });
            };
            if message.content.is_some() {
                // Whatever the caller sent alongside the envelope does not
                // reach disk.
                tracing::warn!(
                    "🔒 Dropping plaintext supplied for encrypted chat: {}",
                    chat_id
                );
            }
            (None, Some(ct), Some(iv), Some(sid))
        } else {
            (message.content, None, None, None)
        };

        let attachment = message
            .attachment
            .map(|bytes| self.transform.apply(bytes));

        let row = MessageRow {
            id: Uuid::new_v4().to_string(),
            chat_id: chat_id.to_string(),
            user_id: identity_ref.to_string(),
            role: message.role.unwrap_or(Role::User),
            content,
            encrypted_data: ciphertext,
            iv,
            session_id,
            attachment,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO messages
                (id, chat_id, user_id, role, content, encrypted_data, iv, session_id, attachment, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&row.id)
        .bind(&row.chat_id)
        .bind(&row.user_id)
        .bind(row.role)
        .bind(&row.content)
        .bind(&row.encrypted_data)
        .bind(&row.iv)
        .bind(&row.session_id)
        .bind(&row.attachment)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;

        if chat.encrypted {
            tracing::info!("🔐 Encrypted message stored in chat: {}", chat_id);
        } else {
            tracing::info!("📝 Plaintext message stored in chat: {}", chat_id);
        }
        Ok(row)
    }

    /// List a chat's messages in insertion order.
    ///
    /// For an encrypted chat, plaintext columns are nulled before rows leave
    /// the store, even if a row somehow violated the write-side gate.
    pub async fn list_messages(
        &self,
        chat_id: &str,
        identity_ref: &str,
    ) -> Result<Vec<MessageRow>, StoreError> {
        let chat = self.get_chat(chat_id, identity_ref).await?;

        let mut rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT * FROM messages WHERE chat_id = ? ORDER BY created_at ASC, rowid ASC",
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await?;

        if chat.encrypted {
            for row in &mut rows {
                row.content = None;
            }
        }
        Ok(rows)
    }
}
