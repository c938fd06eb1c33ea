//! Single-slot result mailbox between the detection worker and the
//! frame-ingestion loop.
//!
//! Exactly one writer (the worker) and one reader (the ingestion loop)
//! at a time. One mutex guards the whole slot, so the read-modify-write
//! of `ready` is part of the critical section and a `ready` result is
//! always a complete detection cycle — no torn reads. At most one
//! unconsumed result exists at any time: the writer must wait for the
//! slot to be free, never overwrite.

use std::sync::Mutex;

use crate::error::TrackError;
use crate::estimate::Estimate;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Slot {
    x: i32,
    y: i32,
    timestamp: i64,
    ready: bool,
}

impl Default for Slot {
    fn default() -> Self {
        // Sentinel position before the first detection completes.
        Self {
            x: -1,
            y: -1,
            timestamp: -1,
            ready: false,
        }
    }
}

/// The mailbox: an explicit owned structure, shared via `Arc` between
/// the two execution contexts and reachable only through these
/// operations.
#[derive(Debug, Default)]
pub struct ResultMailbox {
    slot: Mutex<Slot>,
}

impl ResultMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the slot holds no unconsumed result.
    pub fn is_free(&self) -> bool {
        !self.lock().ready
    }

    /// Publish a completed detection.
    ///
    /// Errors if the previous result has not been consumed yet; the
    /// worker checks [`is_free`](Self::is_free) first and never drops
    /// work, so hitting this is a protocol violation.
    pub fn publish(&self, x: i32, y: i32, timestamp: i64) -> Result<(), TrackError> {
        let mut slot = self.lock();
        if slot.ready {
            return Err(TrackError::ProtocolViolation(
                "mailbox already holds an unconsumed result",
            ));
        }
        *slot = Slot {
            x,
            y,
            timestamp,
            ready: true,
        };
        Ok(())
    }

    /// Publish a detection miss: keep the previous position, stamp the
    /// current frame's timestamp, and mark the slot ready.
    ///
    /// A failed detection still produces an outgoing message — a stale
    /// position paired with a fresh timestamp, rather than a silently
    /// skipped frame.
    pub fn publish_miss(&self, timestamp: i64) -> Result<(), TrackError> {
        let mut slot = self.lock();
        if slot.ready {
            return Err(TrackError::ProtocolViolation(
                "mailbox already holds an unconsumed result",
            ));
        }
        slot.timestamp = timestamp;
        slot.ready = true;
        Ok(())
    }

    /// Non-blocking read: if a result is ready, clear the flag and
    /// return it; otherwise `None`. The ingestion loop only ever polls.
    pub fn take(&self) -> Option<Estimate> {
        let mut slot = self.lock();
        if !slot.ready {
            return None;
        }
        slot.ready = false;
        Some(Estimate::new(slot.x, slot.y, slot.timestamp))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Slot> {
        // A poisoned lock only means a writer panicked mid-update of
        // plain integers; the slot contents stay usable.
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ── Tests ────────────────────────────────────────────────────────
