//! The decrypt-for-display path against real stored rows: success, missing
//! key, and incomplete data each render their own way.

use std::sync::Arc;

use cipher_chat_node::crypto::{CipherService, MemoryKeyStore, SessionKeyStore};
use cipher_chat_node::{decrypt_for_display, DisplayText, NewMessage, Role, Store};

#[tokio::test]
async fn test_display_of_a_decryptable_row() {
    let store = Store::open_in_memory().await.unwrap();
    let keys = MemoryKeyStore::new();
    keys.put("chat-1", "alice", [8u8; 32]).await.unwrap();
    let cipher = CipherService::new(Arc::new(keys));

    let chat = store.create_chat("alice", "private", true).await.unwrap();
    let env = cipher.encrypt("chat-1", "hello again").await.unwrap();
    store
        .store_message(
            &chat.id,
            "alice",
            NewMessage {
                role: Some(Role::Ai),
                ciphertext: Some(env.ciphertext),
                iv: Some(env.iv),
                session_id: Some(env.session_id),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let rows = store.list_messages(&chat.id, "alice").await.unwrap();
    let out = decrypt_for_display(&cipher, &rows[0]).await;
    assert_eq!(out, DisplayText::Plain("hello again".into()));
}

#[tokio::test]
async fn test_display_without_the_session_key() {
    let store = Store::open_in_memory().await.unwrap();

    // Encrypt with one service, display with another that never saw the key.
    let issuing_keys = MemoryKeyStore::new();
    issuing_keys.put("chat-1", "alice", [8u8; 32]).await.unwrap();
    let issuing = CipherService::new(Arc::new(issuing_keys));
    let keyless = CipherService::new(Arc::new(MemoryKeyStore::new()));

    let chat = store.create_chat("alice", "private", true).await.unwrap();
    let env = issuing.encrypt("chat-1", "locked away").await.unwrap();
    store
        .store_message(
            &chat.id,
            "alice",
            NewMessage {
                ciphertext: Some(env.ciphertext),
                iv: Some(env.iv),
                session_id: Some(env.session_id),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let rows = store.list_messages(&chat.id, "alice").await.unwrap();
    let out = decrypt_for_display(&keyless, &rows[0]).await;
    assert_eq!(out, DisplayText::KeyUnavailable);

    // The placeholder is fixed text; the ciphertext is not in it.
    assert!(out.render().starts_with("[Encrypted message"));
}

#[tokio::test]
async fn test_display_of_a_corrupted_row() {
    let store = Store::open_in_memory().await.unwrap();
    let keys = MemoryKeyStore::new();
    keys.put("chat-1", "alice", [8u8; 32]).await.unwrap();
    let cipher = CipherService::new(Arc::new(keys));

    let chat = store.create_chat("alice", "private", true).await.unwrap();
    let env = cipher.encrypt("chat-1", "soon mangled").await.unwrap();
    store
        .store_message(
            &chat.id,
            "alice",
            NewMessage {
                ciphertext: Some(env.ciphertext),
                iv: Some(env.iv),
                session_id: Some(env.session_id),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // Lose the iv column; the row is now incomplete.
    sqlx::query("UPDATE messages SET iv = NULL WHERE chat_id = ?")
        .bind(&chat.id)
        .execute(&store.pool)
        .await
        .unwrap();

    let rows = store.list_messages(&chat.id, "alice").await.unwrap();
    let out = decrypt_for_display(&cipher, &rows[0]).await;
    assert_eq!(out, DisplayText::Incomplete);
    assert_ne!(
        DisplayText::Incomplete.render(),
        DisplayText::KeyUnavailable.render(),
        "the two failure placeholders must be distinguishable"
    );
}

#[tokio::test]
async fn test_display_of_plaintext_rows_needs_no_key() {
    let store = Store::open_in_memory().await.unwrap();
    let cipher = CipherService::new(Arc::new(MemoryKeyStore::new()));

    let chat = store.create_chat("alice", "notes", false).await.unwrap();
    store
        .store_message(
            &chat.id,
            "alice",
            NewMessage {
                role: Some(Role::User),
                content: Some("plain as day".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let rows = store.list_messages(&chat.id, "alice").await.unwrap();
    assert_eq!(
        decrypt_for_display(&cipher, &rows[0]).await,
        DisplayText::Plain("plain as day".into())
    );
}
