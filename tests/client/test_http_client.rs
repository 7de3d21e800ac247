//! Tests for [`EncryptionClient`] against a real node bound to an ephemeral
//! port.

use std::sync::Arc;

use cipher_chat_node::api::{router, AppState};
use cipher_chat_node::crypto::{CipherService, MemoryKeyStore, RekeyPolicy};
use cipher_chat_node::{EncryptionClient, Store};

const TEST_BITS: usize = 256;

async fn spawn_node() -> String {
    let store = Store::open_in_memory().await.unwrap();
    let cipher = Arc::new(CipherService::new(Arc::new(MemoryKeyStore::new())));
    let app = router(AppState {
        cipher,
        store,
        rekey_policy: RekeyPolicy::RewrapExisting,
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_client_handshake_and_round_trip() {
    let base_url = spawn_node().await;
    let client = EncryptionClient::new(&base_url).with_modulus_bits(TEST_BITS);

    let key = client.generate_key("chat-1", "alice").await.unwrap();
    assert_eq!(client.session_key("chat-1").await, Some(key));

    let envelope = client.encrypt("chat-1", "through the client").await.unwrap();
    assert_eq!(envelope.session_id, "chat-1");

    let text = client
        .decrypt("chat-1", &envelope.ciphertext, &envelope.iv)
        .await
        .unwrap();
    assert_eq!(text, "through the client");
}

#[tokio::test]
async fn test_client_rehandshake_recovers_same_key() {
    let base_url = spawn_node().await;

    let first = EncryptionClient::new(&base_url).with_modulus_bits(TEST_BITS);
    let k1 = first.generate_key("chat-1", "alice").await.unwrap();

    // A fresh client simulates a reload; rewrap hands back the same key.
    let second = EncryptionClient::new(&base_url).with_modulus_bits(TEST_BITS);
    let k2 = second.generate_key("chat-1", "alice").await.unwrap();
    assert_eq!(k1, k2);
}

#[tokio::test]
async fn test_client_surfaces_structured_errors() {
    let base_url = spawn_node().await;
    let client = EncryptionClient::new(&base_url).with_modulus_bits(TEST_BITS);

    let err = client.encrypt("never-bound", "hi").await.unwrap_err();
    let text = format!("{:#}", err);
    assert!(
        text.contains("session_key_not_found"),
        "error should carry the node's error_type, got: {}",
        text
    );
}

#[tokio::test]
async fn test_client_health() {
    let base_url = spawn_node().await;
    let client = EncryptionClient::new(&base_url).with_modulus_bits(TEST_BITS);

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.active_sessions, 0);

    client.generate_key("chat-1", "alice").await.unwrap();
    assert_eq!(client.health().await.unwrap().active_sessions, 1);
}
