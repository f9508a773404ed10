use base64::Engine;
use hkdf::Hkdf;
use sha2::Sha256;
use x25519_dalek::PublicKey;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{Error, LocalIdentity, Result};

/// Domain separation for the pairwise key derivation. Both ends of a pair
/// must use the same constant.
const KDF_INFO: &[u8] = b"radius-chat-pairwise-v1";

/// Symmetric AES-256-GCM key shared with exactly one peer.
///
/// Computable only from the local private key and that peer's public key;
/// the relay, holding public keys only, cannot derive it. Not serializable,
/// zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SharedKey([u8; 32]);

impl SharedKey {
    pub(crate) fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for SharedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedKey(<redacted>)")
    }
}

/// Derive the pairwise symmetric key for (our identity, peer public key).
///
/// X25519 Diffie-Hellman followed by HKDF-SHA256. Deterministic and
/// side-effect free for a fixed pair, and symmetric: the peer derives the
/// identical key from its own private key and our public key.
///
/// Fails with [`Error::MalformedPeerKey`] when the supplied string is not
/// base64 for exactly 32 bytes. Callers processing a roster must treat that
/// as a per-peer condition and keep going.
pub fn derive_peer_key(identity: &LocalIdentity, peer_public_key: &str) -> Result<SharedKey> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(peer_public_key)
        .map_err(|e| Error::MalformedPeerKey(e.to_string()))?;

    let raw: [u8; 32] = bytes
        .try_into()
        .map_err(|_| Error::MalformedPeerKey("public key must be 32 bytes".to_string()))?;
    let peer = PublicKey::from(raw);

    let shared = identity.secret().diffie_hellman(&peer);

    let hk = Hkdf::<Sha256>::new(None, shared.as_bytes());
    let mut okm = [0u8; 32];
    hk.expand(KDF_INFO, &mut okm)
        .map_err(|e| Error::CryptoUnavailable(e.to_string()))?;

    Ok(SharedKey(okm))
}
