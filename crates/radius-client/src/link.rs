use radius_protocol::{Error, Result};

/// Outbound half of the relay connection, as seen by the router.
///
/// The router never reads from the transport itself; whoever owns the
/// connection feeds envelopes into `EnvelopeRouter::handle_incoming` one at
/// a time and hands the router this seam for writes.
pub trait RelayLink: Send + Sync {
    fn send_text(&self, payload: String) -> Result<()>;
}

/// Channel-backed link for tests and embedding: every payload the router
/// would send to the relay lands on the receiver instead.
pub struct ChannelLink {
    tx: crossbeam_channel::Sender<String>,
}

impl ChannelLink {
    pub fn new() -> (Self, crossbeam_channel::Receiver<String>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, rx)
    }
}

impl RelayLink for ChannelLink {
    fn send_text(&self, payload: String) -> Result<()> {
        self.tx
            .send(payload)
            .map_err(|_| Error::Transport("relay link receiver dropped".to_string()))
    }
}
