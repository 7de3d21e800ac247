// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Durable Chat Storage
//!
//! SQLite-backed persistence for chats and messages, including the gate that
//! keeps plaintext out of encrypted chats ([`message_store`]).

pub mod db;
pub mod message_store;
pub mod models;

pub use db::Store;
pub use message_store::NewMessage;
pub use models::{ChatRow, MessageRow, Role};

use thiserror::Error;

/// Storage failures the API layer maps onto HTTP statuses.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No chat with this id exists.
    #[error("chat not found: {chat_id}")]
    ChatNotFound { chat_id: String },

    /// The chat exists but belongs to a different identity.
    #[error("identity does not own chat: {chat_id}")]
    Unauthorized { chat_id: String },

    /// An encrypted chat was given a message without a complete envelope.
    /// Caller bug; rejected outright rather than stored degraded.
    #[error("encrypted chat {chat_id} requires ciphertext, iv, and session_id")]
    MissingCiphertext { chat_id: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
