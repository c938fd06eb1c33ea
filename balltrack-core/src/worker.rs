//! Detection worker: a parallel task that drains the frame queue and
//! fills the result mailbox.
//!
//! Loop: dequeue → detect → publish, strictly in arrival order. The
//! worker never touches the network, and it never overwrites an
//! unconsumed mailbox result — it waits for the slot instead of
//! dropping work.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::detect::Detector;
use crate::mailbox::ResultMailbox;
use crate::queue::FrameQueue;

/// Poll interval while waiting for a frame or a free mailbox slot.
/// A tight poll is acceptable at real-time framerates.
const IDLE_POLL: Duration = Duration::from_millis(1);

/// The detection worker. Built on the receiver's event loop, then
/// [`spawn`](Self::spawn)ed onto its own task.
pub struct DetectionWorker {
    queue: Arc<FrameQueue>,
    mailbox: Arc<ResultMailbox>,
    detector: Box<dyn Detector>,
    cancel: CancellationToken,
}

impl DetectionWorker {
    pub fn new(
        queue: Arc<FrameQueue>,
        mailbox: Arc<ResultMailbox>,
        detector: Box<dyn Detector>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            queue,
            mailbox,
            detector,
            cancel,
        }
    }

    /// Spawn the worker loop. Teardown is forceful: cancelling the
    /// token ends the loop without draining in-flight work.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        info!("detection worker started");
        loop {
            if self.cancel.is_cancelled() {
                info!("detection worker cancelled");
                return;
            }

            // Only pop once the mailbox can accept the result.
            if !self.mailbox.is_free() {
                tokio::time::sleep(IDLE_POLL).await;
                continue;
            }
            let Some(frame) = self.queue.pop() else {
                tokio::time::sleep(IDLE_POLL).await;
                continue;
            };

            let published = match self.detector.detect(&frame.image) {
                Some(center) => {
                    debug!(timestamp = frame.timestamp, %center, "detection hit");
                    self.mailbox.publish(center.x, center.y, frame.timestamp)
                }
                None => {
                    // Miss: report the stale position under the fresh
                    // timestamp rather than skipping the frame.
                    debug!(timestamp = frame.timestamp, "detection miss");
                    self.mailbox.publish_miss(frame.timestamp)
                }
            };

            // The ingestion loop is not notified; permanent mailbox
            // silence is the observable symptom of a dead worker.
            if let Err(e) = published {
                error!("detection worker terminating: {e}");
                return;
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
