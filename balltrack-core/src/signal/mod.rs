//! Signaling messages and their TCP transport.
//!
//! The rendezvous channel carries three kinds of objects: an
//! offer/answer session description, a connectivity candidate, and an
//! explicit end-of-session marker. The transport is assumed reliable,
//! ordered, and point-to-point; here it is a JSON-per-line TCP stream.

mod codec;

pub use codec::{MAX_SIGNAL_FRAME, SignalCodec, SignalConnection};

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

// ── DescriptionKind ──────────────────────────────────────────────

/// Whether a session description is an offer or the matching answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptionKind {
    Offer,
    Answer,
}

impl std::fmt::Display for DescriptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Offer => write!(f, "offer"),
            Self::Answer => write!(f, "answer"),
        }
    }
}

// ── SignalMessage ────────────────────────────────────────────────

/// One signaling object, as exchanged during session establishment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignalMessage {
    /// A session description. The offer advertises where the offerer's
    /// media endpoint listens; the answer carries no address.
    Description {
        kind: DescriptionKind,
        media_addr: Option<SocketAddr>,
    },

    /// An additional connectivity address for the active session.
    Candidate { addr: SocketAddr },

    /// Explicit end-of-session marker.
    Bye,
}

impl SignalMessage {
    pub fn offer(media_addr: SocketAddr) -> Self {
        Self::Description {
            kind: DescriptionKind::Offer,
            media_addr: Some(media_addr),
        }
    }

    pub fn answer() -> Self {
        Self::Description {
            kind: DescriptionKind::Answer,
            media_addr: None,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
