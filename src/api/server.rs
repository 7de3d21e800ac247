// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP front end for the encryption node.
//!
//! Routes:
//! - `POST /api/encryption/generate-key`: handshake, wraps a session key
//!   under the client's RSA public key
//! - `POST /api/encryption/encrypt` / `POST /api/encryption/decrypt`:
//!   session-keyed AES-GCM transforms
//! - `GET  /api/encryption/health`: liveness plus session counters
//! - `POST /api/chats`, `DELETE /api/chats/:chat_id`: chat lifecycle
//! - `POST`/`GET /api/chats/:chat_id/messages`: the persistence gate

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use super::errors::ApiError;
use crate::crypto::{
    issue_session_key, parse_public_key, CipherService, EncryptedEnvelope, IssuedKey,
    PublicKeyWire, RekeyPolicy,
};
use crate::storage::{ChatRow, MessageRow, NewMessage, Role, Store};

#[derive(Clone)]
pub struct AppState {
    pub cipher: Arc<CipherService>,
    pub store: Store,
    pub rekey_policy: RekeyPolicy,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateKeyRequest {
    pub session_id: String,
    pub user_id: String,
    pub public_key: PublicKeyWire,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptRequest {
    pub session_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptRequest {
    pub session_id: String,
    pub ciphertext: String,
    pub iv: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptResponse {
    pub plaintext: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub active_sessions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChatRequest {
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub encrypted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreMessageRequest {
    pub user_id: String,
    pub role: Option<Role>,
    pub content: Option<String>,
    pub ciphertext: Option<String>,
    pub iv: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentityQuery {
    pub user_id: String,
}

fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::ValidationError {
            field: field.to_string(),
            message: format!("'{}' must not be empty", field),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/encryption/generate-key", post(generate_key_handler))
        .route("/api/encryption/encrypt", post(encrypt_handler))
        .route("/api/encryption/decrypt", post(decrypt_handler))
        .route("/api/encryption/health", get(health_handler))
        .route("/api/chats", post(create_chat_handler))
        .route(
            "/api/chats/:chat_id",
            axum::routing::delete(delete_chat_handler),
        )
        .route(
            "/api/chats/:chat_id/messages",
            post(store_message_handler).get(list_messages_handler),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🚀 Encryption node listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn generate_key_handler(
    State(state): State<AppState>,
    Json(request): Json<GenerateKeyRequest>,
) -> Result<Json<IssuedKey>, ApiError> {
    require("session_id", &request.session_id)?;
    require("user_id", &request.user_id)?;

    let public = parse_public_key(&request.public_key.n, &request.public_key.e)?;
    let issued = issue_session_key(
        state.cipher.key_store().as_ref(),
        &request.session_id,
        &request.user_id,
        &public,
        state.rekey_policy,
    )
    .await?;

    Ok(Json(issued))
}

async fn encrypt_handler(
    State(state): State<AppState>,
    Json(request): Json<EncryptRequest>,
) -> Result<Json<EncryptedEnvelope>, ApiError> {
    require("session_id", &request.session_id)?;
    let envelope = state
        .cipher
        .encrypt(&request.session_id, &request.message)
        .await?;
    Ok(Json(envelope))
}

async fn decrypt_handler(
    State(state): State<AppState>,
    Json(request): Json<DecryptRequest>,
) -> Result<Json<DecryptResponse>, ApiError> {
    require("session_id", &request.session_id)?;
    let plaintext = state
        .cipher
        .decrypt(&request.session_id, &request.ciphertext, &request.iv)
        .await?;
    Ok(Json(DecryptResponse { plaintext }))
}

async fn health_handler(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let active_sessions = state
        .cipher
        .key_store()
        .count()
        .await
        .map_err(ApiError::from)?;
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        service: "encryption".to_string(),
        active_sessions,
    }))
}

async fn create_chat_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateChatRequest>,
) -> Result<Json<ChatRow>, ApiError> {
    require("user_id", &request.user_id)?;
    require("title", &request.title)?;
    let chat = state
        .store
        .create_chat(&request.user_id, &request.title, request.encrypted)
        .await?;
    Ok(Json(chat))
}

async fn delete_chat_handler(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    Query(identity): Query<IdentityQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.store.delete_chat(&chat_id, &identity.user_id).await?;
    Ok(Json(serde_json::json!({ "deleted": chat_id })))
}

async fn store_message_handler(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    Json(request): Json<StoreMessageRequest>,
) -> Result<Json<MessageRow>, ApiError> {
    require("user_id", &request.user_id)?;
    let row = state
        .store
        .store_message(
            &chat_id,
            &request.user_id,
            NewMessage {
                role: request.role,
                content: request.content,
                ciphertext: request.ciphertext,
                iv: request.iv,
                session_id: request.session_id,
                attachment: None,
            },
        )
        .await?;
    Ok(Json(row))
}

async fn list_messages_handler(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    Query(identity): Query<IdentityQuery>,
) -> Result<Json<Vec<MessageRow>>, ApiError> {
    let rows = state.store.list_messages(&chat_id, &identity.user_id).await?;
    Ok(Json(rows))
}
