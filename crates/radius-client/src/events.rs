/// Conditions that end the session. Surfaced to the caller exactly once;
/// there is no automatic reconnect, a new attempt means a new identity.
#[derive(Debug, Clone, PartialEq)]
pub enum FatalKind {
    /// The OS crypto primitives are unavailable; the session never started.
    CryptoUnavailable(String),
    /// The relay closed the connection.
    TransportClosed,
    /// Transport-level failure with the relay's reason, if any.
    Transport(String),
    /// The room at our coordinates is at capacity.
    RoomFull {
        message: String,
        current_users: u32,
        max_users: u32,
    },
    /// Relay-reported error, passed through verbatim.
    Relay(String),
}

/// Everything the session reports to its caller. The caller is always
/// informed through these; it is never left silently stalled.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    PeerCountChanged(usize),
    MessageReceived { text: String, sender_id: String },
    OwnMessageSent(String),
    StatusChanged(String),
    Fatal(FatalKind),
}

/// Result of one `send` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// One envelope went to the relay with this many recipient entries.
    Sent { recipients: usize },
    /// Nobody to talk to; the relay was not contacted.
    NoPeers,
}
