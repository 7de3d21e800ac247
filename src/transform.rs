// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Attachment Transform Seam
//!
//! Image steganography (and any other attachment processing) lives outside
//! this node. The storage layer sees it only as an opaque `bytes -> bytes`
//! function applied before a blob reaches the persistence gate; it has no
//! bearing on the encryption invariants.

/// Opaque transform applied to attachment bytes ahead of storage.
pub trait AttachmentTransform: Send + Sync {
    fn apply(&self, bytes: Vec<u8>) -> Vec<u8>;
}

/// Pass-through transform used when no external processor is configured.
pub struct IdentityTransform;

impl AttachmentTransform for IdentityTransform {
    fn apply(&self, bytes: Vec<u8>) -> Vec<u8> {
        bytes
    }
}
