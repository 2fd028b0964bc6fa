// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use sha2::{Digest, Sha256};

/// Derive the server-facing public id for a content id.
/// Format: pub-{hash} where hash is first 16 hex chars of SHA256(content_id)
///
/// Stable across attempts, so re-delivering a publish after a lost response
/// targets the same backend record.
pub fn derive_public_id(content_id: &str) -> String {
    let hash = Sha256::digest(content_id.as_bytes());
    format!("pub-{}", hex::encode(&hash[..8]))
}

/// Generate a new local content identifier.
pub fn new_content_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
