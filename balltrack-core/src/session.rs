//! Drives the handshake state machine over a signaling connection.
//!
//! One `Session` per peer per connection. Signaling errors split into
//! two categories: per-message noise, which is logged and survived,
//! and transport failure after establishment, which is fatal for a
//! two-party single-session system.

use std::net::SocketAddr;

use tracing::{info, warn};

use crate::error::TrackError;
use crate::handshake::{Handshake, HandshakePhase, Role};
use crate::signal::{DescriptionKind, SignalConnection, SignalMessage};

/// A peer session: handshake state plus the signaling channel that
/// feeds it.
pub struct Session {
    handshake: Handshake,
    signal: SignalConnection,
    /// Media endpoint advertised by the offerer's description.
    remote_media_addr: Option<SocketAddr>,
    /// Extra connectivity addresses merged from candidate messages.
    candidates: Vec<SocketAddr>,
}

impl Session {
    pub fn new(role: Role, signal: SignalConnection) -> Self {
        Self {
            handshake: Handshake::new(role),
            signal,
            remote_media_addr: None,
            candidates: Vec::new(),
        }
    }

    pub fn phase(&self) -> HandshakePhase {
        self.handshake.phase()
    }

    pub fn is_open(&self) -> bool {
        self.handshake.is_open()
    }

    pub fn is_closed(&self) -> bool {
        self.handshake.is_closed()
    }

    /// Where the offerer's media endpoint listens, once known.
    pub fn remote_media_addr(&self) -> Option<SocketAddr> {
        self.remote_media_addr
    }

    pub fn candidates(&self) -> &[SocketAddr] {
        &self.candidates
    }

    /// Offerer only: synthesize and transmit the offer description
    /// before reading anything from the peer.
    pub async fn offer(&mut self, media_addr: SocketAddr) -> Result<(), TrackError> {
        if self.handshake.role() != Role::Offerer {
            return Err(TrackError::ProtocolViolation("only the offerer offers"));
        }
        self.signal.send(SignalMessage::offer(media_addr)).await?;
        self.handshake.mark_local_sent()?;
        info!(%media_addr, "offer transmitted");
        Ok(())
    }

    /// Consume the next signaling message and advance the handshake.
    ///
    /// Returns `Ok(true)` while signaling should continue, `Ok(false)`
    /// exactly once when the peer says goodbye (or the stream ends) —
    /// never an error for a clean termination. A transport failure
    /// after this point is session-fatal and surfaces as
    /// [`TrackError::SignalingFatal`].
    pub async fn consume_signal(&mut self) -> Result<bool, TrackError> {
        let msg = match self.signal.recv().await {
            Ok(Some(msg)) => msg,
            Ok(None) => {
                info!("signaling stream ended");
                self.handshake.close();
                return Ok(false);
            }
            Err(e) => return Err(TrackError::SignalingFatal(e.to_string())),
        };

        match msg {
            SignalMessage::Description { kind, media_addr } => {
                self.handshake.accept_remote()?;
                if let Some(addr) = media_addr {
                    self.remote_media_addr = Some(addr);
                }
                info!(%kind, "remote description accepted");

                // The answerer transmits its matching answer before
                // declaring the session open.
                if kind == DescriptionKind::Offer {
                    self.signal.send(SignalMessage::answer()).await?;
                    self.handshake.declare_open()?;
                    info!("answer transmitted, session open");
                }
                Ok(true)
            }
            SignalMessage::Candidate { addr } => {
                match self.handshake.merge_candidate() {
                    Ok(()) => {
                        self.candidates.push(addr);
                        info!(%addr, "candidate merged");
                    }
                    // Noise local to one message: log and continue.
                    Err(e) => warn!(%addr, "ignoring candidate: {e}"),
                }
                Ok(true)
            }
            SignalMessage::Bye => {
                info!("goodbye received, session closed");
                self.handshake.close();
                Ok(false)
            }
        }
    }

    /// Transmit the end-of-session marker and close the local state.
    pub async fn send_bye(&mut self) -> Result<(), TrackError> {
        self.signal.send(SignalMessage::Bye).await?;
        self.handshake.close();
        Ok(())
    }
}
