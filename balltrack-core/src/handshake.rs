//! Session handshake state machine, shared by both peer roles.
//!
//! Models the offer/answer lifecycle with validated transitions that
//! return `Result` instead of panicking. Exactly one execution context
//! drives the machine per peer, so it needs no locking.

use crate::error::TrackError;

// ── Role ─────────────────────────────────────────────────────────

/// Which side of the offer/answer exchange this peer plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Synthesizes and transmits its description before ever reading a
    /// peer message (the sender).
    Offerer,
    /// Waits for the remote description first (the receiver).
    Answerer,
}

// ── HandshakePhase ───────────────────────────────────────────────

/// The current phase of the session handshake.
///
/// ```text
///               (offerer)
///  Idle ──────────────────────► LocalDescriptionSet ──► Open
///                                        ▲               │
///               (answerer)               │               ▼
///  AwaitingRemoteDescription ────────────┘             Closed ◄── (Bye, any state)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakePhase {
    /// Offerer initial state: no description exchanged yet.
    Idle,

    /// Answerer initial state: waiting for the peer's offer.
    AwaitingRemoteDescription,

    /// This peer's own description has been synthesized and sent.
    LocalDescriptionSet,

    /// Both descriptions exchanged; media and data may flow.
    Open,

    /// Terminal. Entered unconditionally on a termination marker.
    Closed,
}

impl std::fmt::Display for HandshakePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::AwaitingRemoteDescription => write!(f, "AwaitingRemoteDescription"),
            Self::LocalDescriptionSet => write!(f, "LocalDescriptionSet"),
            Self::Open => write!(f, "Open"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

// ── Handshake ────────────────────────────────────────────────────

/// Per-peer handshake state: role, phase, and whether the remote
/// description has been accepted (candidates are only meaningful
/// afterwards).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handshake {
    role: Role,
    phase: HandshakePhase,
    remote_accepted: bool,
}

impl Handshake {
    pub fn new(role: Role) -> Self {
        let phase = match role {
            Role::Offerer => HandshakePhase::Idle,
            Role::Answerer => HandshakePhase::AwaitingRemoteDescription,
        };
        Self {
            role,
            phase,
            remote_accepted: false,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn phase(&self) -> HandshakePhase {
        self.phase
    }

    /// Whether data may flow.
    pub fn is_open(&self) -> bool {
        self.phase == HandshakePhase::Open
    }

    pub fn is_closed(&self) -> bool {
        self.phase == HandshakePhase::Closed
    }

    // ── Transitions ──────────────────────────────────────────────

    /// The offerer has synthesized and transmitted its description.
    ///
    /// Valid from: `Idle`.
    pub fn mark_local_sent(&mut self) -> Result<(), TrackError> {
        match self.phase {
            HandshakePhase::Idle => {
                self.phase = HandshakePhase::LocalDescriptionSet;
                Ok(())
            }
            _ => Err(TrackError::ProtocolViolation(
                "local description already set",
            )),
        }
    }

    /// A remote description arrived while this peer was awaiting one.
    ///
    /// Offerer (`LocalDescriptionSet`): the answer completes the
    /// exchange and the session is `Open`. Answerer
    /// (`AwaitingRemoteDescription`): the offer is accepted, and this
    /// peer must synthesize and transmit its answer (then
    /// [`declare_open`](Self::declare_open)) before data may flow.
    pub fn accept_remote(&mut self) -> Result<(), TrackError> {
        match (self.role, self.phase) {
            (Role::Offerer, HandshakePhase::LocalDescriptionSet) => {
                self.remote_accepted = true;
                self.phase = HandshakePhase::Open;
                Ok(())
            }
            (Role::Answerer, HandshakePhase::AwaitingRemoteDescription) => {
                self.remote_accepted = true;
                self.phase = HandshakePhase::LocalDescriptionSet;
                Ok(())
            }
            _ => Err(TrackError::ProtocolViolation(
                "unexpected remote description",
            )),
        }
    }

    /// The answerer has transmitted its answer description.
    ///
    /// Valid from: `LocalDescriptionSet` with a remote accepted.
    pub fn declare_open(&mut self) -> Result<(), TrackError> {
        match self.phase {
            HandshakePhase::LocalDescriptionSet if self.remote_accepted => {
                self.phase = HandshakePhase::Open;
                Ok(())
            }
            _ => Err(TrackError::ProtocolViolation(
                "cannot open before both descriptions are exchanged",
            )),
        }
    }

    /// A connectivity candidate arrived. Valid any time after the
    /// remote description has been accepted; the phase is unchanged.
    pub fn merge_candidate(&mut self) -> Result<(), TrackError> {
        if self.is_closed() {
            return Err(TrackError::ProtocolViolation("candidate after close"));
        }
        if !self.remote_accepted {
            return Err(TrackError::ProtocolViolation(
                "candidate before remote description",
            ));
        }
        Ok(())
    }

    /// Termination marker: transition to `Closed` from any state,
    /// unconditionally.
    pub fn close(&mut self) {
        self.phase = HandshakePhase::Closed;
    }
}

// ── Tests ────────────────────────────────────────────────────────
