use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use radius_protocol::{Error, LocalIdentity, Result};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, warn};

use crate::{ClientEvent, ConnectParams, EnvelopeRouter, FatalKind, RelayLink, SendOutcome};

/// Everything needed to join a room: the relay endpoint and the coordinates
/// the relay buckets us by. The optional invite token grants entry to
/// invite-only rooms.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub url: String,
    pub latitude: f64,
    pub longitude: f64,
    pub invite: Option<String>,
}

enum Command {
    Send(String),
    Close,
}

/// Handle to one live relay connection.
///
/// All protocol state lives in a single reader task that owns the router:
/// inbound envelopes and outbound sends are serialized through it, one at a
/// time, in order. Dropping the handle closes the connection.
pub struct RadiusClient {
    cmd_tx: mpsc::UnboundedSender<Command>,
}

struct WriterLink {
    tx: mpsc::UnboundedSender<String>,
}

impl RelayLink for WriterLink {
    fn send_text(&self, payload: String) -> Result<()> {
        self.tx
            .send(payload)
            .map_err(|_| Error::TransportClosed)
    }
}

impl RadiusClient {
    /// Generate a fresh identity, open the WebSocket, perform the handshake
    /// and start the session loop. Events arrive on `events` from here on.
    ///
    /// Identity generation happens before the transport is touched; if the
    /// OS crypto primitives are unavailable the caller gets a fatal event
    /// and an error, and the relay never sees us.
    pub async fn connect(
        options: ConnectOptions,
        events: crossbeam_channel::Sender<ClientEvent>,
    ) -> Result<RadiusClient> {
        let identity = match LocalIdentity::generate() {
            Ok(identity) => identity,
            Err(e) => {
                let _ = events.send(ClientEvent::Fatal(FatalKind::CryptoUnavailable(
                    e.to_string(),
                )));
                return Err(e);
            }
        };

        let _ = events.send(ClientEvent::StatusChanged("connecting".to_string()));

        let (ws, _) = connect_async(options.url.as_str())
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        let (mut sink, mut stream) = ws.split();

        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
        tokio::spawn(async move {
            while let Some(payload) = out_rx.recv().await {
                if sink.send(Message::Text(payload)).await.is_err() {
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let params = ConnectParams {
            latitude: options.latitude,
            longitude: options.longitude,
            invite: options.invite,
        };
        let link = Arc::new(WriterLink { tx: out_tx });
        let loop_events = events.clone();
        let mut router = EnvelopeRouter::new(identity, params, link, events);
        router.on_transport_open()?;

        let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<Command>();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    command = cmd_rx.recv() => match command {
                        Some(Command::Send(text)) => match router.send(&text) {
                            Ok(SendOutcome::NoPeers) => {
                                // `send` is fire-and-forget on this handle, so
                                // the short-circuit has to reach the caller as
                                // an event rather than a return value.
                                debug!("send with zero peers, relay not contacted");
                                let _ = loop_events.send(ClientEvent::StatusChanged(
                                    "no peers nearby".to_string(),
                                ));
                            }
                            Ok(SendOutcome::Sent { recipients }) => {
                                debug!(recipients, "fan-out envelope sent");
                            }
                            Err(e) => warn!(error = %e, "send failed"),
                        },
                        Some(Command::Close) | None => {
                            router.on_transport_closed(None);
                            break;
                        }
                    },
                    frame = stream.next() => match frame {
                        Some(Ok(Message::Text(raw))) => router.handle_incoming(&raw),
                        Some(Ok(Message::Close(_))) | None => {
                            router.on_transport_closed(None);
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            router.on_transport_closed(Some(e.to_string()));
                            break;
                        }
                    },
                }
            }
        });

        Ok(RadiusClient { cmd_tx })
    }

    /// Queue one message for fan-out to every current peer.
    pub fn send(&self, text: impl Into<String>) -> Result<()> {
        self.cmd_tx
            .send(Command::Send(text.into()))
            .map_err(|_| Error::TransportClosed)
    }

    /// Close the connection. The session cannot be resumed; reconnecting
    /// means a new `connect` call and a new identity.
    pub fn close(&self) {
        let _ = self.cmd_tx.send(Command::Close);
    }
}
