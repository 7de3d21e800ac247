// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::env;
use std::sync::Arc;

use anyhow::Result;
use cipher_chat_node::{
    api::{start_server, AppState},
    CipherService, NodeConfig, SqliteKeyStore, Store,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    println!("🚀 Starting Cipher Chat Node...\n");

    let config = NodeConfig::from_env()?;
    tracing::info!(
        "⚙️  listen={} db={} rsa_bits={} rekey={:?}",
        config.listen_addr,
        config.db_path.display(),
        config.rsa_bits,
        config.rekey_policy
    );

    let store = Store::open(&config.db_path).await?;
    let key_store = SqliteKeyStore::new(store.pool.clone()).await?;
    let cipher = Arc::new(CipherService::new(Arc::new(key_store)));

    let state = AppState {
        cipher,
        store,
        rekey_policy: config.rekey_policy,
    };

    start_server(state, config.listen_addr).await
}
