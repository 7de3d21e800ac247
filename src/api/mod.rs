// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP API for the encryption node: handshake, encrypt/decrypt, chat and
//! message persistence.

pub mod errors;
pub mod server;

pub use errors::{ApiError, ErrorResponse};
pub use server::{
    router, start_server, AppState, CreateChatRequest, DecryptRequest, DecryptResponse,
    EncryptRequest, GenerateKeyRequest, HealthResponse, StoreMessageRequest,
};
