//! Tests for the chat and message endpoints, including the full client flow:
//! handshake over HTTP, encrypt, store, list, decrypt.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

use cipher_chat_node::api::{router, AppState, ErrorResponse};
use cipher_chat_node::crypto::{CipherService, MemoryKeyStore, RekeyPolicy, SessionKeyStore};
use cipher_chat_node::Store;

async fn test_app() -> (Router, MemoryKeyStore) {
    let store = Store::open_in_memory().await.unwrap();
    let keys = MemoryKeyStore::new();
    let cipher = Arc::new(CipherService::new(Arc::new(keys.clone())));
    let app = router(AppState {
        cipher,
        store,
        rekey_policy: RekeyPolicy::RewrapExisting,
    });
    (app, keys)
}

async fn request_json(
    app: &Router,
    method: &str,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn create_chat(app: &Router, user: &str, encrypted: bool) -> String {
    let (status, chat) = request_json(
        app,
        "POST",
        "/api/chats",
        Some(json!({ "user_id": user, "title": "test chat", "encrypted": encrypted })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    chat["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_plaintext_chat_message_flow() {
    let (app, _keys) = test_app().await;
    let chat_id = create_chat(&app, "alice", false).await;

    let (status, row) = request_json(
        &app,
        "POST",
        &format!("/api/chats/{}/messages", chat_id),
        Some(json!({ "user_id": "alice", "role": "user", "content": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(row["content"], "hello");
    assert_eq!(row["encrypted_data"], Value::Null);

    let (status, rows) = request_json(
        &app,
        "GET",
        &format!("/api/chats/{}/messages?user_id=alice", chat_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_encrypted_chat_flow_end_to_end() {
    let (app, keys) = test_app().await;
    keys.put("chat-1", "alice", [6u8; 32]).await.unwrap();
    let chat_id = create_chat(&app, "alice", true).await;

    // Encrypt over HTTP, then store the envelope.
    let (_, envelope) = request_json(
        &app,
        "POST",
        "/api/encryption/encrypt",
        Some(json!({ "session_id": "chat-1", "message": "secret payload" })),
    )
    .await;

    let (status, row) = request_json(
        &app,
        "POST",
        &format!("/api/chats/{}/messages", chat_id),
        Some(json!({
            "user_id": "alice",
            "role": "user",
            "content": "secret payload",
            "ciphertext": envelope["ciphertext"],
            "iv": envelope["iv"],
            "session_id": "chat-1"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // The plaintext sent alongside the envelope was dropped at the gate.
    assert_eq!(row["content"], Value::Null);

    // Listed rows carry only the envelope; decrypt recovers the text.
    let (_, rows) = request_json(
        &app,
        "GET",
        &format!("/api/chats/{}/messages?user_id=alice", chat_id),
        None,
    )
    .await;
    let stored = &rows.as_array().unwrap()[0];
    assert_eq!(stored["content"], Value::Null);

    let (status, decrypted) = request_json(
        &app,
        "POST",
        "/api/encryption/decrypt",
        Some(json!({
            "session_id": "chat-1",
            "ciphertext": stored["encrypted_data"],
            "iv": stored["iv"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decrypted["plaintext"], "secret payload");
}

#[tokio::test]
async fn test_encrypted_chat_rejects_missing_envelope() {
    let (app, _keys) = test_app().await;
    let chat_id = create_chat(&app, "alice", true).await;

    let (status, body) = request_json(
        &app,
        "POST",
        &format!("/api/chats/{}/messages", chat_id),
        Some(json!({ "user_id": "alice", "role": "user", "content": "plaintext only" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let err: ErrorResponse = serde_json::from_value(body).unwrap();
    assert_eq!(err.error_type, "validation_error");
}

#[tokio::test]
async fn test_foreign_chat_access_is_forbidden() {
    let (app, _keys) = test_app().await;
    let chat_id = create_chat(&app, "alice", false).await;

    let (status, body) = request_json(
        &app,
        "GET",
        &format!("/api/chats/{}/messages?user_id=mallory", chat_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let err: ErrorResponse = serde_json::from_value(body).unwrap();
    assert_eq!(err.error_type, "unauthorized");
}

#[tokio::test]
async fn test_unknown_chat_is_404() {
    let (app, _keys) = test_app().await;
    let (status, _) = request_json(
        &app,
        "GET",
        "/api/chats/no-such-chat/messages?user_id=alice",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_chat_removes_messages() {
    let (app, _keys) = test_app().await;
    let chat_id = create_chat(&app, "alice", false).await;

    request_json(
        &app,
        "POST",
        &format!("/api/chats/{}/messages", chat_id),
        Some(json!({ "user_id": "alice", "role": "user", "content": "bye" })),
    )
    .await;

    let (status, _) = request_json(
        &app,
        "DELETE",
        &format!("/api/chats/{}?user_id=alice", chat_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request_json(
        &app,
        "GET",
        &format!("/api/chats/{}/messages?user_id=alice", chat_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
