use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One encrypted message for one recipient: a random 12-byte nonce and the
/// AES-GCM output (ciphertext plus tag), both base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ciphertext {
    pub iv: String,
    pub data: String,
}

/// Room occupancy details the relay attaches to roster updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomInfo {
    pub current_users: u32,
    pub max_users: u32,
    #[serde(default)]
    pub room_hash: String,
}

/// Everything the relay can deliver, dispatched on the `type` field.
///
/// Unknown fields inside a known variant are ignored; an unrecognized
/// `type` fails to parse and is dropped by the router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayEnvelope {
    /// The relay's current view of co-located peers, our own key excluded.
    Peers {
        pubs: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room_info: Option<RoomInfo>,
    },

    /// Fan-out message: one independent ciphertext per intended recipient,
    /// keyed by recipient public key. `from` is the sender's public key.
    Msg {
        from: String,
        to: HashMap<String, Ciphertext>,
    },

    /// Legacy single-recipient message. `peer` is the sender's public key;
    /// every member of the room receives a copy and only the addressee's
    /// copy authenticates.
    Direct {
        peer: String,
        iv: String,
        data: String,
    },

    /// The room at our coordinates is at capacity. Session-fatal.
    RoomFull {
        message: String,
        current_users: u32,
        max_users: u32,
    },

    /// Relay-side failure, surfaced verbatim. Session-fatal.
    Error { message: String },
}

/// The single message sent to the relay right after transport open.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Handshake {
    #[serde(rename = "pub")]
    pub public_key: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invite: Option<String>,
}
