//! Ground-truth ledger and error evaluator (sender side).
//!
//! One entry per emitted frame, keyed by the frame's tick. An entry is
//! evicted exactly once — when the matching client estimate is
//! resolved, or when it ages past the configured cap (a lost reply
//! must not leak memory forever).

use std::collections::HashMap;

use crate::error::TrackError;
use crate::frame::Point;

/// Map from frame timestamp to the true ball position.
///
/// Single-owner: lives on the sender's event loop, no synchronization.
#[derive(Debug, Default)]
pub struct GroundTruthLedger {
    entries: HashMap<i64, Point>,
}

impl GroundTruthLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the true position for a frame tick.
    ///
    /// Timestamps are unique per session; recording the same tick
    /// twice is a programming error and fails fast.
    pub fn record(&mut self, timestamp: i64, position: Point) -> Result<(), TrackError> {
        if self.entries.contains_key(&timestamp) {
            return Err(TrackError::DuplicateTimestamp(timestamp));
        }
        self.entries.insert(timestamp, position);
        Ok(())
    }

    /// Remove and return the entry for `timestamp`.
    ///
    /// Returns [`TrackError::UnknownTimestamp`] when the tick was never
    /// recorded or was already evicted (duplicate or late reply). The
    /// caller logs and continues; this never aborts the evaluator loop.
    pub fn resolve(&mut self, timestamp: i64) -> Result<Point, TrackError> {
        self.entries
            .remove(&timestamp)
            .ok_or(TrackError::UnknownTimestamp(timestamp))
    }

    /// Euclidean pixel distance between the true and estimated
    /// positions. No other normalization.
    pub fn evaluate(actual: Point, estimated: Point) -> f64 {
        actual.distance_to(estimated)
    }

    /// Resolve the entry for an estimate and score it in one step.
    /// Eviction is unconditional on success.
    pub fn score(&mut self, estimated: Point, timestamp: i64) -> Result<f64, TrackError> {
        let actual = self.resolve(timestamp)?;
        Ok(Self::evaluate(actual, estimated))
    }

    /// Drop entries older than `max_age` ticks relative to `now`.
    /// Returns how many were evicted.
    pub fn prune(&mut self, now: i64, max_age: i64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|&ts, _| now - ts <= max_age);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        self.entries.contains_key(&timestamp)
    }
}

// ── Tests ────────────────────────────────────────────────────────
