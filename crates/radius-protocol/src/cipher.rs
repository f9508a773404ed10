use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::{Ciphertext, Error, Result, SharedKey, NONCE_LEN};

/// Authenticated encryption of one message under a pairwise key.
///
/// A fresh random nonce is drawn for every call, including when the same
/// plaintext is sealed for several recipients during fan-out. No length
/// limit is enforced here; the transport may impose its own.
pub fn seal(plaintext: &str, key: &SharedKey) -> Result<Ciphertext> {
    let mut iv = [0u8; NONCE_LEN];
    OsRng
        .try_fill_bytes(&mut iv)
        .map_err(|e| Error::CryptoUnavailable(e.to_string()))?;

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    let encrypted = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext.as_bytes())
        .map_err(|e| Error::Encryption(e.to_string()))?;

    let b64 = &base64::engine::general_purpose::STANDARD;
    Ok(Ciphertext {
        iv: b64.encode(iv),
        data: b64.encode(encrypted),
    })
}

/// Authenticated decryption. Fails with [`Error::Decryption`] on tag
/// mismatch, wrong key, or malformed nonce/data. Callers must treat that as
/// a dropped message, never as a connection-level error.
pub fn open(ciphertext: &Ciphertext, key: &SharedKey) -> Result<String> {
    let b64 = &base64::engine::general_purpose::STANDARD;
    let iv = b64
        .decode(&ciphertext.iv)
        .map_err(|e| Error::Decryption(e.to_string()))?;
    let data = b64
        .decode(&ciphertext.data)
        .map_err(|e| Error::Decryption(e.to_string()))?;

    if iv.len() != NONCE_LEN {
        return Err(Error::Decryption(format!(
            "nonce must be {} bytes, got {}",
            NONCE_LEN,
            iv.len()
        )));
    }

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&iv), data.as_ref())
        .map_err(|_| Error::Decryption("authentication failed".to_string()))?;

    String::from_utf8(plaintext).map_err(|e| Error::Decryption(e.to_string()))
}
