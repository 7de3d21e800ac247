// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Decrypt-for-Display Path
//!
//! Reconstructs readable text from a stored message. Three outcomes are
//! distinguished by type, never by sniffing placeholder strings:
//!
//! 1. [`DisplayText::Plain`]: decryption succeeded, or the row belongs to a
//!    plaintext chat
//! 2. [`DisplayText::KeyUnavailable`]: the session key is missing or the
//!    transform failed; fixed placeholder, the user should re-handshake
//! 3. [`DisplayText::Incomplete`]: the envelope itself is partial or
//!    absent; distinct placeholder, the data is corrupt
//!
//! Raw ciphertext and raw error text never reach the UI.

use crate::crypto::{CipherService, CryptoError};
use crate::storage::MessageRow;

/// Placeholder shown when the session key cannot be resolved or the
/// transform fails.
pub const KEY_UNAVAILABLE_PLACEHOLDER: &str =
    "[Encrypted message: cannot decrypt without the session key]";

/// Placeholder shown when the stored envelope is incomplete.
pub const INCOMPLETE_PLACEHOLDER: &str = "[Encrypted message: stored data is incomplete]";

/// Outcome of one decrypt-for-display attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayText {
    /// Readable text, shown as-is.
    Plain(String),
    /// Key missing or ciphertext failed authentication.
    KeyUnavailable,
    /// Envelope fields missing or partial.
    Incomplete,
}

impl DisplayText {
    /// The string a renderer shows for this outcome.
    pub fn render(&self) -> &str {
        match self {
            DisplayText::Plain(text) => text,
            DisplayText::KeyUnavailable => KEY_UNAVAILABLE_PLACEHOLDER,
            DisplayText::Incomplete => INCOMPLETE_PLACEHOLDER,
        }
    }
}

/// Resolve one stored message to displayable text.
///
/// Never returns an error and never exposes ciphertext: every failure maps
/// onto one of the placeholder variants.
pub async fn decrypt_for_display(cipher: &CipherService, message: &MessageRow) -> DisplayText {
    if let Some(envelope) = message.envelope() {
        return match cipher
            .decrypt(&envelope.session_id, &envelope.ciphertext, &envelope.iv)
            .await
        {
            Ok(text) => DisplayText::Plain(text),
            Err(CryptoError::SessionKeyNotFound { session_id }) => {
                tracing::warn!("🔒 No session key for {}; showing placeholder", session_id);
                DisplayText::KeyUnavailable
            }
            Err(e) => {
                tracing::warn!("🔒 Decrypt failed for message {}: {}", message.id, e);
                DisplayText::KeyUnavailable
            }
        };
    }

    if message.has_partial_envelope() {
        return DisplayText::Incomplete;
    }

    match &message.content {
        Some(text) => DisplayText::Plain(text.clone()),
        None => DisplayText::Incomplete,
    }
}
