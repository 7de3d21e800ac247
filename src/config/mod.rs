// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Node configuration from environment variables.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::crypto::keygen::MIN_SECURE_BITS;
use crate::crypto::RekeyPolicy;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Address the HTTP API binds to. `LISTEN_ADDR`, default `127.0.0.1:8080`.
    pub listen_addr: SocketAddr,
    /// SQLite database path. `DB_PATH`, default `./chat.db`.
    pub db_path: PathBuf,
    /// Modulus size clients are told to use. `RSA_BITS`, default 2048 and
    /// never below [`MIN_SECURE_BITS`].
    pub rsa_bits: usize,
    /// Handshake behavior for already-bound sessions. `REKEY_POLICY`, either
    /// `rewrap_existing` (default) or `reject_if_bound`.
    pub rekey_policy: RekeyPolicy,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".parse().expect("static addr"),
            db_path: PathBuf::from("./chat.db"),
            rsa_bits: crate::crypto::keygen::DEFAULT_MODULUS_BITS,
            rekey_policy: RekeyPolicy::default(),
        }
    }
}

impl NodeConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let listen_addr = match env::var("LISTEN_ADDR") {
            Ok(s) => s
                .parse()
                .map_err(|e| anyhow::anyhow!("LISTEN_ADDR '{}' is not an address: {}", s, e))?,
            Err(_) => defaults.listen_addr,
        };

        let db_path = env::var("DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let rsa_bits = env::var("RSA_BITS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults.rsa_bits);
        if rsa_bits < MIN_SECURE_BITS {
            anyhow::bail!(
                "RSA_BITS must be at least {} (got {})",
                MIN_SECURE_BITS,
                rsa_bits
            );
        }

        let rekey_policy = match env::var("REKEY_POLICY").as_deref() {
            Ok("reject_if_bound") => RekeyPolicy::RejectIfBound,
            Ok("rewrap_existing") | Err(_) => RekeyPolicy::RewrapExisting,
            Ok(other) => anyhow::bail!("unknown REKEY_POLICY '{}'", other),
        };

        Ok(Self {
            listen_addr,
            db_path,
            rsa_bits,
            rekey_policy,
        })
    }
}
