// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Database row models; these map to/from SQL rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::EncryptedEnvelope;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    /// The human party.
    User,
    /// The automated responder.
    Ai,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChatRow {
    pub id: String,
    pub user_id: String,
    pub title: String,
    /// When set, the persistence gate refuses plaintext for this chat.
    pub encrypted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One stored message. For an encrypted chat, `content` is always NULL and
/// the envelope columns are set; for a plaintext chat, the reverse. Rows are
/// immutable once written and only deleted with the owning chat.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MessageRow {
    pub id: String,
    pub chat_id: String,
    pub user_id: String,
    pub role: Role,
    pub content: Option<String>,
    pub encrypted_data: Option<String>,
    pub iv: Option<String>,
    pub session_id: Option<String>,
    /// Opaque blob, already passed through the attachment transform.
    pub attachment: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
}

impl MessageRow {
    /// The envelope triple, when all three columns are present.
    ///
    /// Returns `None` for plaintext rows and for rows whose envelope is
    /// incomplete; display code treats those two cases differently, so it
    /// checks [`has_partial_envelope`](Self::has_partial_envelope) as well.
    pub fn envelope(&self) -> Option<EncryptedEnvelope> {
        match (&self.encrypted_data, &self.iv, &self.session_id) {
            (Some(ciphertext), Some(iv), Some(session_id)) => Some(EncryptedEnvelope {
                ciphertext: ciphertext.clone(),
                iv: iv.clone(),
                session_id: session_id.clone(),
            }),
            _ => None,
        }
    }

    /// True when some but not all envelope columns are set, corrupt or
    /// truncated data.
    pub fn has_partial_envelope(&self) -> bool {
        let set = [
            self.encrypted_data.is_some(),
            self.iv.is_some(),
            self.session_id.is_some(),
        ];
        set.iter().any(|b| *b) && !set.iter().all(|b| *b)
    }
}
