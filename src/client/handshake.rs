// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP client for the encryption node.
//!
//! Wraps the handshake and the encrypt/decrypt endpoints. Keys recovered by
//! [`EncryptionClient::generate_key`] live only in this struct's memory;
//! nothing here persists them.

use std::collections::HashMap;

use anyhow::{bail, Context};
use tokio::sync::RwLock;

use crate::api::{
    DecryptRequest, DecryptResponse, EncryptRequest, ErrorResponse, GenerateKeyRequest,
    HealthResponse,
};
use crate::crypto::keygen::DEFAULT_MODULUS_BITS;
use crate::crypto::{ClientHandshake, EncryptedEnvelope, IssuedKey, SessionKey};

pub struct EncryptionClient {
    http: reqwest::Client,
    base_url: String,
    modulus_bits: usize,
    keys: RwLock<HashMap<String, SessionKey>>,
}

impl EncryptionClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            modulus_bits: DEFAULT_MODULUS_BITS,
            keys: RwLock::new(HashMap::new()),
        }
    }

    /// Override the handshake keypair size. Small sizes keep tests fast.
    pub fn with_modulus_bits(mut self, bits: usize) -> Self {
        self.modulus_bits = bits;
        self
    }

    /// The raw key bound for `session_id`, if a handshake has completed.
    pub async fn session_key(&self, session_id: &str) -> Option<SessionKey> {
        self.keys.read().await.get(session_id).copied()
    }

    /// Run the handshake for `session_id` and bind the returned key.
    ///
    /// Generates an ephemeral RSA keypair, posts the public half to
    /// `generate-key`, unwraps the response with the private half, and
    /// caches the recovered key in memory.
    pub async fn generate_key(
        &self,
        session_id: &str,
        user_id: &str,
    ) -> anyhow::Result<SessionKey> {
        let (public_key, pending) = ClientHandshake::begin(session_id, self.modulus_bits)
            .context("handshake keypair generation failed")?;

        let request = GenerateKeyRequest {
            session_id: session_id.to_string(),
            user_id: user_id.to_string(),
            public_key,
        };
        let issued: IssuedKey = self
            .post("/api/encryption/generate-key", &request)
            .await
            .context("generate-key request failed")?;

        let bound = pending.bind(&issued).context("could not unwrap session key")?;
        self.keys
            .write()
            .await
            .insert(session_id.to_string(), bound.key);

        tracing::info!("🔑 Session key bound for session: {}", session_id);
        Ok(bound.key)
    }

    /// Encrypt `message` on the node under the session's key.
    pub async fn encrypt(
        &self,
        session_id: &str,
        message: &str,
    ) -> anyhow::Result<EncryptedEnvelope> {
        self.post(
            "/api/encryption/encrypt",
            &EncryptRequest {
                session_id: session_id.to_string(),
                message: message.to_string(),
            },
        )
        .await
    }

    /// Decrypt a stored envelope on the node.
    pub async fn decrypt(
        &self,
        session_id: &str,
        ciphertext: &str,
        iv: &str,
    ) -> anyhow::Result<String> {
        let response: DecryptResponse = self
            .post(
                "/api/encryption/decrypt",
                &DecryptRequest {
                    session_id: session_id.to_string(),
                    ciphertext: ciphertext.to_string(),
                    iv: iv.to_string(),
                },
            )
            .await?;
        Ok(response.plaintext)
    }

    pub async fn health(&self) -> anyhow::Result<HealthResponse> {
        let url = format!("{}/api/encryption/health", self.base_url);
        let response = self.http.get(&url).send().await?;
        Ok(response.error_for_status()?.json().await?)
    }

    async fn post<Req, Resp>(&self, path: &str, body: &Req) -> anyhow::Result<Resp>
    where
        Req: serde::Serialize,
        Resp: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self.http.post(&url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            // The node answers errors with a structured body; surface its
            // error_type when we can parse one.
            let text = response.text().await.unwrap_or_default();
            if let Ok(err) = serde_json::from_str::<ErrorResponse>(&text) {
                bail!("{} returned {}: {} ({})", path, status, err.message, err.error_type);
            }
            bail!("{} returned {}", path, status);
        }
        Ok(response.json().await?)
    }
}
