use std::collections::HashMap;
use std::sync::Arc;

use radius_protocol::{
    open, seal, Ciphertext, Error, Handshake, LocalIdentity, PeerSessionStore, PendingQueue,
    RelayEnvelope, Result,
};
use tracing::{debug, warn};

use crate::{ClientEvent, FatalKind, RelayLink, SendOutcome};

/// Where the session currently stands. A router only exists once a
/// connection attempt is underway, so `Connecting` is the initial phase;
/// before that there is no session to speak of. `Closed` is terminal: a
/// reconnect requires a fresh identity and a fresh router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Connecting,
    AwaitingRoster,
    Active,
    Closed,
}

/// What the handshake tells the relay about us, besides our public key.
#[derive(Debug, Clone)]
pub struct ConnectParams {
    pub latitude: f64,
    pub longitude: f64,
    pub invite: Option<String>,
}

/// Classifies inbound relay traffic and assembles outbound fan-out
/// envelopes.
///
/// Exclusively owns the peer store and the pending queue for one
/// connection. Envelopes must be fed in arrival order, one at a time; that
/// ordering is what keeps the pending-queue replay free of races between
/// "roster creates the secret" and "message decrypts with it". Sends go
/// through `&mut self`, so a second send cannot start while one is being
/// assembled.
pub struct EnvelopeRouter {
    identity: LocalIdentity,
    peers: PeerSessionStore,
    pending: PendingQueue,
    link: Arc<dyn RelayLink>,
    events: crossbeam_channel::Sender<ClientEvent>,
    params: ConnectParams,
    phase: SessionPhase,
}

impl EnvelopeRouter {
    pub fn new(
        identity: LocalIdentity,
        params: ConnectParams,
        link: Arc<dyn RelayLink>,
        events: crossbeam_channel::Sender<ClientEvent>,
    ) -> Self {
        Self {
            identity,
            peers: PeerSessionStore::new(),
            pending: PendingQueue::new(),
            link,
            events,
            params,
            phase: SessionPhase::Connecting,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn public_key(&self) -> &str {
        self.identity.public_key()
    }

    pub fn peer_count(&self) -> usize {
        self.peers.count()
    }

    /// The transport is open: send the one handshake message and start
    /// waiting for the first roster.
    pub fn on_transport_open(&mut self) -> Result<()> {
        if self.phase != SessionPhase::Connecting {
            return Ok(());
        }

        let handshake = Handshake {
            public_key: self.identity.public_key().to_string(),
            lat: self.params.latitude,
            lon: self.params.longitude,
            invite: self.params.invite.clone(),
        };
        self.link.send_text(serde_json::to_string(&handshake)?)?;

        self.phase = SessionPhase::AwaitingRoster;
        self.emit(ClientEvent::StatusChanged("connected".to_string()));
        Ok(())
    }

    /// Process one inbound relay payload. Per-peer and per-message failures
    /// are handled here and never propagate; nothing in this path ends the
    /// session except a room-full or relay-error envelope.
    pub fn handle_incoming(&mut self, raw: &str) {
        if self.phase == SessionPhase::Closed {
            return;
        }

        let envelope: RelayEnvelope = match serde_json::from_str(raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, "dropping unparseable relay payload");
                return;
            }
        };

        match envelope {
            RelayEnvelope::Peers { pubs, .. } => self.on_roster(pubs),
            RelayEnvelope::Msg { from, mut to } => {
                // Only the entry addressed to our key concerns us; an
                // envelope without one was never meant for us.
                match to.remove(self.identity.public_key()) {
                    Some(ciphertext) => self.on_ciphertext(from, ciphertext),
                    None => debug!("fan-out envelope not addressed to us, ignoring"),
                }
            }
            RelayEnvelope::Direct { peer, iv, data } => {
                self.on_ciphertext(peer, Ciphertext { iv, data });
            }
            RelayEnvelope::RoomFull {
                message,
                current_users,
                max_users,
            } => {
                self.phase = SessionPhase::Closed;
                self.emit(ClientEvent::Fatal(FatalKind::RoomFull {
                    message,
                    current_users,
                    max_users,
                }));
            }
            RelayEnvelope::Error { message } => {
                self.phase = SessionPhase::Closed;
                self.emit(ClientEvent::Fatal(FatalKind::Relay(message)));
            }
        }
    }

    fn on_roster(&mut self, pubs: Vec<String>) {
        let mut created_any = false;
        for peer_key in &pubs {
            match self.peers.ensure_peer(&self.identity, peer_key) {
                Ok((created, session)) => {
                    if created {
                        debug!(peer = %session.display_id, "established pairwise secret");
                        created_any = true;
                    }
                }
                // One bad key must not cost us the rest of the roster.
                Err(Error::MalformedPeerKey(reason)) => {
                    warn!(%reason, "skipping malformed peer key in roster");
                }
                Err(e) => {
                    warn!(error = %e, "skipping peer from roster");
                }
            }
        }

        if self.phase == SessionPhase::AwaitingRoster {
            self.phase = SessionPhase::Active;
        }

        if created_any {
            self.replay_pending();
        }

        self.emit(ClientEvent::PeerCountChanged(self.peers.count()));
    }

    fn replay_pending(&mut self) {
        let peers = &self.peers;
        let ready = self.pending.take_ready(|sender| peers.contains(sender));
        for entry in ready {
            self.decrypt_and_deliver(&entry.sender, &entry.ciphertext);
        }
    }

    fn on_ciphertext(&mut self, sender: String, ciphertext: Ciphertext) {
        if self.peers.contains(&sender) {
            self.decrypt_and_deliver(&sender, &ciphertext);
        } else {
            // Roster update for this sender has not arrived yet; hold the
            // message until it does.
            debug!("queueing message from not-yet-known sender");
            self.pending.push(sender, ciphertext);
        }
    }

    fn decrypt_and_deliver(&mut self, sender: &str, ciphertext: &Ciphertext) {
        let Some(session) = self.peers.get(sender) else {
            debug!("sender disappeared before replay, dropping message");
            return;
        };

        match open(ciphertext, &session.shared_key) {
            Ok(text) => {
                let sender_id = session.display_id.clone();
                self.emit(ClientEvent::MessageReceived { text, sender_id });
            }
            // Expected for legacy copies sealed for someone else; for
            // anything else it still only costs this one message.
            Err(e) => debug!(error = %e, "dropping undecryptable message"),
        }
    }

    /// Encrypt `text` once per current peer and transmit a single fan-out
    /// envelope. With zero peers the relay is not contacted at all.
    pub fn send(&mut self, text: &str) -> Result<SendOutcome> {
        if self.phase == SessionPhase::Closed {
            return Err(Error::TransportClosed);
        }

        if self.peers.count() == 0 {
            return Ok(SendOutcome::NoPeers);
        }

        let mut to = HashMap::new();
        for (peer_key, shared_key) in self.peers.snapshot() {
            // Independent seal per recipient: fresh nonce every time, and
            // one failing peer never blocks the rest.
            match seal(text, &shared_key) {
                Ok(ciphertext) => {
                    to.insert(peer_key, ciphertext);
                }
                Err(e) => warn!(error = %e, "omitting peer from envelope"),
            }
        }

        let recipients = to.len();
        let envelope = RelayEnvelope::Msg {
            from: self.identity.public_key().to_string(),
            to,
        };
        self.link.send_text(serde_json::to_string(&envelope)?)?;
        self.emit(ClientEvent::OwnMessageSent(text.to_string()));

        Ok(SendOutcome::Sent { recipients })
    }

    /// Transport-level close or error. Terminal from any phase.
    pub fn on_transport_closed(&mut self, reason: Option<String>) {
        if self.phase == SessionPhase::Closed {
            return;
        }
        self.phase = SessionPhase::Closed;
        self.emit(ClientEvent::StatusChanged("disconnected".to_string()));
        let kind = match reason {
            Some(reason) => FatalKind::Transport(reason),
            None => FatalKind::TransportClosed,
        };
        self.emit(ClientEvent::Fatal(kind));
    }

    fn emit(&self, event: ClientEvent) {
        // A caller that dropped its receiver has nothing more to hear.
        let _ = self.events.send(event);
    }
}
