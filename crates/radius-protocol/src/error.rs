use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The OS random number generator is unavailable. Fatal: a session
    /// cannot start without fresh key material.
    #[error("Crypto unavailable: {0}")]
    CryptoUnavailable(String),

    /// A peer public key from a roster update could not be decoded.
    /// Isolated per peer; never aborts processing of the rest of the roster.
    #[error("Malformed peer key: {0}")]
    MalformedPeerKey(String),

    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Tag mismatch, wrong key, or malformed nonce/data. Non-fatal: the
    /// message is dropped, the session keeps running.
    #[error("Decryption error: {0}")]
    Decryption(String),

    #[error("Transport closed")]
    TransportClosed,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
