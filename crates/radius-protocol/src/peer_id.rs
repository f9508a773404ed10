use sha2::{Digest, Sha256};

use crate::DISPLAY_ID_LEN;

/// Derive the short display identifier for a peer from its serialized
/// public key.
///
/// SHA-256 over the UTF-8 bytes of the key string, hex-encoded and truncated
/// to 15 characters. No salt, so the same key yields the same id on every
/// device. The odd truncation length discards half of the last hash byte;
/// kept as-is for compatibility with existing clients.
///
/// Display-only: collisions are possible (roughly 2^-30 per pair) and
/// harmless. This id must never be used for authentication or lookup.
pub fn derive_display_id(public_key: &str) -> String {
    let digest = Sha256::digest(public_key.as_bytes());
    let mut id = hex::encode(digest);
    id.truncate(DISPLAY_ID_LEN);
    id
}
