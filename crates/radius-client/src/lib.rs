//! Session layer for Radius Chat.
//!
//! [`EnvelopeRouter`] turns inbound relay payloads into caller events and
//! outbound text into per-peer encrypted fan-out envelopes, on top of the
//! primitives from `radius-protocol`. [`RadiusClient`] runs a router inside
//! a single-consumer loop over a WebSocket relay connection.
//!
//! The relay is untrusted by construction: it sees public keys and
//! ciphertext, nothing else.

mod connection;
mod events;
mod link;
mod router;

pub use connection::{ConnectOptions, RadiusClient};
pub use events::{ClientEvent, FatalKind, SendOutcome};
pub use link::{ChannelLink, RelayLink};
pub use router::{ConnectParams, EnvelopeRouter, SessionPhase};

pub use radius_protocol::{Error, Result};
