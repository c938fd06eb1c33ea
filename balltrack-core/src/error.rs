//! Domain-specific error types for the balltrack protocol.
//!
//! All fallible operations return `Result<T, TrackError>`.
//! Errors local to a single frame or message are caught and logged by
//! the loop that produced them; only a session-fatal transport failure
//! is allowed to take the process down.

use thiserror::Error;

/// The canonical error type for balltrack.
#[derive(Debug, Error)]
pub enum TrackError {
    // ── Ledger Errors ────────────────────────────────────────────
    /// A ground-truth entry was recorded twice for the same tick.
    /// Timestamps are unique per session; this is a programming error
    /// at the call site.
    #[error("duplicate ground-truth timestamp: {0}")]
    DuplicateTimestamp(i64),

    /// An estimate referenced a timestamp that was never recorded or
    /// was already evicted (late or duplicate reply).
    #[error("no ground-truth entry for timestamp {0}")]
    UnknownTimestamp(i64),

    // ── Wire Errors ──────────────────────────────────────────────
    /// An estimate message did not match the `x\ty\ttimestamp` form.
    #[error("malformed estimate message: {0:?}")]
    MalformedEstimate(String),

    /// A peer violated the handshake or pipeline rules.
    #[error("protocol violation: {0}")]
    ProtocolViolation(&'static str),

    /// A signaling frame exceeded the codec limit.
    #[error("signal frame too large: {size} bytes (max {max})")]
    SignalFrameTooLarge { size: usize, max: usize },

    /// A media frame exceeded the codec limit.
    #[error("media frame too large: {size} bytes (max {max})")]
    MediaFrameTooLarge { size: usize, max: usize },

    // ── Session Errors ───────────────────────────────────────────
    /// The underlying signaling transport failed after the session was
    /// established. Deliberately not recoverable for a two-party,
    /// single-session system.
    #[error("session-fatal signaling failure: {0}")]
    SignalingFatal(String),

    // ── Connection Errors ────────────────────────────────────────
    /// The TCP/IO layer reported an error.
    #[error("connection error: {0}")]
    Connection(#[from] std::io::Error),

    /// An mpsc channel was closed unexpectedly.
    #[error("channel closed")]
    ChannelClosed,

    // ── Serialization Errors ─────────────────────────────────────
    /// Encoding or decoding of a payload failed.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Catch-all for errors that do not fit another variant.
    #[error("{0}")]
    Other(String),
}

// ── Convenient From implementations ──────────────────────────────

impl From<String> for TrackError {
    fn from(s: String) -> Self {
        TrackError::Other(s)
    }
}

impl From<&str> for TrackError {
    fn from(s: &str) -> Self {
        TrackError::Other(s.to_string())
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for TrackError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        TrackError::ChannelClosed
    }
}

impl From<Box<bincode::ErrorKind>> for TrackError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        TrackError::Encoding(e.to_string())
    }
}

impl From<serde_json::Error> for TrackError {
    fn from(e: serde_json::Error) -> Self {
        TrackError::Encoding(e.to_string())
    }
}
