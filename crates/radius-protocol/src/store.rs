use std::collections::HashMap;

use crate::{derive_display_id, derive_peer_key, LocalIdentity, Result, SharedKey};

/// Everything we hold for one peer: its wire identity, the pairwise key,
/// and the short id shown next to its messages.
#[derive(Debug, Clone)]
pub struct PeerSession {
    pub public_key: String,
    pub shared_key: SharedKey,
    pub display_id: String,
}

/// The live mapping of peer public key to session: the authoritative state
/// of who we can talk to right now.
///
/// Owned by exactly one router per connection; never shared across
/// connections and never persisted. Append-only: the relay's roster updates
/// are the only membership signal and a peer's later absence does not remove
/// its session.
#[derive(Debug, Default)]
pub struct PeerSessionStore {
    sessions: HashMap<String, PeerSession>,
}

impl PeerSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up or create the session for a peer key.
    ///
    /// The single choke point guaranteeing at most one key derivation per
    /// peer per session: an already-known key returns `(false, session)`
    /// without touching the agreement. A malformed key propagates
    /// [`crate::Error::MalformedPeerKey`] and inserts nothing.
    pub fn ensure_peer(
        &mut self,
        identity: &LocalIdentity,
        peer_public_key: &str,
    ) -> Result<(bool, &PeerSession)> {
        if self.sessions.contains_key(peer_public_key) {
            return Ok((false, &self.sessions[peer_public_key]));
        }

        let shared_key = derive_peer_key(identity, peer_public_key)?;
        let session = PeerSession {
            public_key: peer_public_key.to_string(),
            shared_key,
            display_id: derive_display_id(peer_public_key),
        };

        Ok((
            true,
            self.sessions
                .entry(peer_public_key.to_string())
                .or_insert(session),
        ))
    }

    pub fn get(&self, peer_public_key: &str) -> Option<&PeerSession> {
        self.sessions.get(peer_public_key)
    }

    pub fn contains(&self, peer_public_key: &str) -> bool {
        self.sessions.contains_key(peer_public_key)
    }

    /// Current (peer key, shared key) pairs for fan-out. Order carries no
    /// meaning.
    pub fn snapshot(&self) -> Vec<(String, SharedKey)> {
        self.sessions
            .iter()
            .map(|(k, v)| (k.clone(), v.shared_key.clone()))
            .collect()
    }

    pub fn count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn ensure_peer_is_idempotent() {
        let me = LocalIdentity::generate().unwrap();
        let peer = LocalIdentity::generate().unwrap();
        let mut store = PeerSessionStore::new();

        let (created, first) = store.ensure_peer(&me, peer.public_key()).unwrap();
        assert!(created);
        let first_key = first.shared_key.clone();

        let (created, second) = store.ensure_peer(&me, peer.public_key()).unwrap();
        assert!(!created);
        assert_eq!(second.shared_key, first_key);
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn malformed_key_inserts_nothing() {
        let me = LocalIdentity::generate().unwrap();
        let mut store = PeerSessionStore::new();

        let result = store.ensure_peer(&me, "garbage!!");
        assert!(matches!(result, Err(Error::MalformedPeerKey(_))));
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn snapshot_covers_all_peers() {
        let me = LocalIdentity::generate().unwrap();
        let a = LocalIdentity::generate().unwrap();
        let b = LocalIdentity::generate().unwrap();
        let mut store = PeerSessionStore::new();

        store.ensure_peer(&me, a.public_key()).unwrap();
        store.ensure_peer(&me, b.public_key()).unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 2);
        let keys: Vec<&str> = snapshot.iter().map(|(k, _)| k.as_str()).collect();
        assert!(keys.contains(&a.public_key()));
        assert!(keys.contains(&b.public_key()));
    }

    #[test]
    fn session_carries_display_id() {
        let me = LocalIdentity::generate().unwrap();
        let peer = LocalIdentity::generate().unwrap();
        let mut store = PeerSessionStore::new();

        let (_, session) = store.ensure_peer(&me, peer.public_key()).unwrap();
        assert_eq!(session.display_id, derive_display_id(peer.public_key()));
        assert_eq!(session.display_id.len(), 15);
    }
}
