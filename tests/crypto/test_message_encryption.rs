//! Tests for session-keyed message encryption through [`CipherService`].

use std::sync::Arc;

use cipher_chat_node::crypto::{
    CipherService, CryptoError, MemoryKeyStore, SessionKeyStore, SqliteKeyStore,
};
use cipher_chat_node::Store;

async fn service() -> (CipherService, MemoryKeyStore) {
    let store = MemoryKeyStore::new();
    let svc = CipherService::new(Arc::new(store.clone()));
    (svc, store)
}

#[tokio::test]
async fn test_round_trip_preserves_unicode() {
    let (svc, store) = service().await;
    store.put("s1", "alice", [7u8; 32]).await.unwrap();

    let text = "héllo wörld 👋 日本語";
    let env = svc.encrypt("s1", text).await.unwrap();
    assert_eq!(svc.decrypt("s1", &env.ciphertext, &env.iv).await.unwrap(), text);
}

#[tokio::test]
async fn test_each_envelope_gets_a_fresh_iv() {
    let (svc, store) = service().await;
    store.put("s1", "alice", [7u8; 32]).await.unwrap();

    let a = svc.encrypt("s1", "same text").await.unwrap();
    let b = svc.encrypt("s1", "same text").await.unwrap();
    assert_ne!(a.iv, b.iv, "IV must be unique per call");
    assert_ne!(a.ciphertext, b.ciphertext);
}

#[tokio::test]
async fn test_envelope_decrypts_only_under_its_session() {
    let (svc, store) = service().await;
    store.put("s1", "alice", [1u8; 32]).await.unwrap();
    store.put("s2", "alice", [2u8; 32]).await.unwrap();

    let env = svc.encrypt("s1", "for s1 only").await.unwrap();
    let err = svc.decrypt("s2", &env.ciphertext, &env.iv).await.unwrap_err();
    assert!(matches!(err, CryptoError::TransformFailure { .. }));
}

#[tokio::test]
async fn test_tampered_ciphertext_fails_authentication() {
    let (svc, store) = service().await;
    store.put("s1", "alice", [7u8; 32]).await.unwrap();

    let env = svc.encrypt("s1", "integrity matters").await.unwrap();
    let mut bytes = {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD
            .decode(&env.ciphertext)
            .unwrap()
    };
    bytes[0] ^= 0x01;
    let tampered = {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&bytes)
    };

    let err = svc.decrypt("s1", &tampered, &env.iv).await.unwrap_err();
    assert!(matches!(err, CryptoError::TransformFailure { .. }));
}

#[tokio::test]
async fn test_missing_session_is_distinguishable_from_corruption() {
    let (svc, _store) = service().await;
    let err = svc.decrypt("never-bound", "AAAA", "AAAA").await.unwrap_err();
    assert!(matches!(err, CryptoError::SessionKeyNotFound { .. }));
}

#[tokio::test]
async fn test_decrypt_works_after_cache_loss_with_sqlite_store() {
    let store = Store::open_in_memory().await.unwrap();
    let keys = SqliteKeyStore::new(store.pool.clone()).await.unwrap();
    keys.put("s1", "alice", [9u8; 32]).await.unwrap();

    let svc = CipherService::new(Arc::new(keys.clone()));
    let env = svc.encrypt("s1", "durable").await.unwrap();

    // Fresh service over the same pool: empty cache, key comes from SQLite.
    let svc2 = CipherService::new(Arc::new(keys));
    assert_eq!(svc2.cached_sessions().await, 0);
    assert_eq!(
        svc2.decrypt("s1", &env.ciphertext, &env.iv).await.unwrap(),
        "durable"
    );
    assert_eq!(svc2.cached_sessions().await, 1);
}
