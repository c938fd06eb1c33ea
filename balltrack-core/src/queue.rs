//! Bounded FIFO hand-off of frames from the ingestion loop to the
//! detection worker.
//!
//! Only the ingestion loop appends and only the worker removes, in
//! strict arrival order. The queue is bounded with an explicit
//! drop-oldest policy: when the detector falls behind the frame rate,
//! the stalest frames are discarded (and counted) instead of letting
//! the queue grow without bound.

use std::collections::VecDeque;
use std::sync::Mutex;

use tracing::warn;

use crate::frame::FramePacket;

#[derive(Debug, Default)]
struct Inner {
    frames: VecDeque<FramePacket>,
    dropped: u64,
}

/// Shared frame queue. The only cross-context state besides the
/// mailbox; reachable solely through these operations.
#[derive(Debug)]
pub struct FrameQueue {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl FrameQueue {
    /// A queue holding at most `capacity` frames (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            capacity: capacity.max(1),
        }
    }

    /// Append a frame. When the queue is full the oldest frame is
    /// dropped first; returns `true` if that happened.
    pub fn push(&self, frame: FramePacket) -> bool {
        let mut inner = self.lock();
        let mut dropped = false;
        if inner.frames.len() == self.capacity {
            if let Some(stale) = inner.frames.pop_front() {
                inner.dropped += 1;
                dropped = true;
                warn!(
                    timestamp = stale.timestamp,
                    total_dropped = inner.dropped,
                    "frame queue full, dropping oldest frame"
                );
            }
        }
        inner.frames.push_back(frame);
        dropped
    }

    /// Remove the oldest frame, if any.
    pub fn pop(&self) -> Option<FramePacket> {
        self.lock().frames.pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total frames discarded by the drop-oldest policy.
    pub fn dropped(&self) -> u64 {
        self.lock().dropped
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Image;

    fn frame(ts: i64) -> FramePacket {
        FramePacket::new(Image::new(2, 2), ts)
    }

    #[test]
    fn fifo_order() {
        let queue = FrameQueue::new(8);
        for ts in 0..5 {
            queue.push(frame(ts));
        }
        for ts in 0..5 {
            assert_eq!(queue.pop().unwrap().timestamp, ts);
        }
        assert!(queue.pop().is_none());
    }

    #[test]
    fn drops_oldest_at_capacity() {
        let queue = FrameQueue::new(3);
        assert!(!queue.push(frame(0)));
        assert!(!queue.push(frame(1)));
        assert!(!queue.push(frame(2)));
        assert!(queue.push(frame(3)));

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.dropped(), 1);
        // frame 0 is gone, order of the rest is preserved
        assert_eq!(queue.pop().unwrap().timestamp, 1);
        assert_eq!(queue.pop().unwrap().timestamp, 2);
        assert_eq!(queue.pop().unwrap().timestamp, 3);
    }

    #[test]
    fn capacity_is_at_least_one() {
        let queue = FrameQueue::new(0);
        assert_eq!(queue.capacity(), 1);
        queue.push(frame(0));
        queue.push(frame(1));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop().unwrap().timestamp, 1);
    }
}
