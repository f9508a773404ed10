//! Protocol core for Radius Chat: devices physically near each other
//! exchange end-to-end encrypted text over a relay that never sees plaintext
//! or private keys.
//!
//! This crate holds the pure, runtime-free pieces: the ephemeral local
//! identity, pairwise secret agreement, the authenticated cipher, wire
//! envelopes, the peer session store, and the buffer for traffic that
//! outruns its roster update. The session loop and transport live in
//! `radius-client`.

mod agreement;
mod cipher;
mod envelope;
mod error;
mod identity;
mod peer_id;
mod pending;
mod store;

pub use agreement::{derive_peer_key, SharedKey};
pub use cipher::{open, seal};
pub use envelope::{Ciphertext, Handshake, RelayEnvelope, RoomInfo};
pub use error::{Error, Result};
pub use identity::LocalIdentity;
pub use peer_id::derive_display_id;
pub use pending::{PendingMessage, PendingQueue};
pub use store::{PeerSession, PeerSessionStore};

/// AES-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// Display ids are the hash prefix shown next to messages: 15 hex chars,
/// an intentionally odd length kept for compatibility with existing clients.
pub const DISPLAY_ID_LEN: usize = 15;
