// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Client-Side Paths
//!
//! The two things a chat client does with this node's crypto: run the
//! handshake that binds a session key ([`handshake`]), and turn stored rows
//! back into something readable ([`display`]).

pub mod display;
pub mod handshake;

pub use display::{decrypt_for_display, DisplayText};
pub use handshake::EncryptionClient;
