// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod client;
pub mod config;
pub mod crypto;
pub mod storage;
pub mod transform;

// Re-export main types
pub use client::{decrypt_for_display, DisplayText, EncryptionClient};
pub use config::NodeConfig;
pub use crypto::{
    CipherService, ClientHandshake, CryptoError, EncryptedEnvelope, IssuedKey, MemoryKeyStore,
    RekeyPolicy, RsaKeypair, RsaPublicKey, SessionKeyStore, SqliteKeyStore,
};
pub use storage::{ChatRow, MessageRow, NewMessage, Role, Store, StoreError};
pub use transform::{AttachmentTransform, IdentityTransform};
