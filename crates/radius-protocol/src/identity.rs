use crate::{Error, Result};
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use x25519_dalek::{PublicKey, StaticSecret};

/// One ephemeral X25519 key pair, generated fresh per connection attempt.
///
/// The secret component never leaves this struct: it is only reachable from
/// the key agreement in this crate, is not serializable, and is zeroized on
/// drop by `x25519_dalek`. Identities are never reused across reconnects.
pub struct LocalIdentity {
    secret: StaticSecret,
    public: PublicKey,
    public_b64: String,
}

impl LocalIdentity {
    /// Generate a fresh identity restricted to key agreement.
    ///
    /// Fails with [`Error::CryptoUnavailable`] if the OS RNG cannot produce
    /// key material. That condition is fatal for the session; there is no
    /// retry.
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| Error::CryptoUnavailable(e.to_string()))?;

        let secret = StaticSecret::from(bytes);
        let public = PublicKey::from(&secret);
        let public_b64 = base64::engine::general_purpose::STANDARD.encode(public.as_bytes());

        Ok(Self {
            secret,
            public,
            public_b64,
        })
    }

    /// The transport-safe serialization of the public key. Serialized once
    /// and reused for the life of the session; this string is how peers and
    /// the relay refer to us.
    pub fn public_key(&self) -> &str {
        &self.public_b64
    }

    pub(crate) fn secret(&self) -> &StaticSecret {
        &self.secret
    }
}

impl std::fmt::Debug for LocalIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalIdentity")
            .field("public", &self.public_b64)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_produces_distinct_identities() {
        let a = LocalIdentity::generate().unwrap();
        let b = LocalIdentity::generate().unwrap();
        assert_ne!(a.public_key(), b.public_key());
    }

    #[test]
    fn public_key_is_valid_base64_of_32_bytes() {
        let id = LocalIdentity::generate().unwrap();
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(id.public_key())
            .unwrap();
        assert_eq!(decoded.len(), 32);
        assert_eq!(PublicKey::from(&id.secret).as_bytes()[..], decoded[..]);
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let id = LocalIdentity::generate().unwrap();
        let rendered = format!("{:?}", id);
        assert!(rendered.contains("<redacted>"));
    }
}
