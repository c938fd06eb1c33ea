//! Receiver-side frame ingestion loop.
//!
//! For each inbound frame: enqueue it for the detection worker, then
//! opportunistically poll the result mailbox — never block on it — and
//! ship any fresh estimate back over the channel. The loop ends when
//! the media stream does, at which point the worker is torn down
//! forcefully (no in-flight work survives shutdown, by design).

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::TrackError;
use crate::mailbox::ResultMailbox;
use crate::media::{ChannelMessage, MediaConnection};
use crate::queue::FrameQueue;

/// Run the ingestion loop until end-of-stream. Returns the number of
/// frames ingested.
pub async fn run_ingestion(
    media: &mut MediaConnection,
    queue: Arc<FrameQueue>,
    mailbox: Arc<ResultMailbox>,
    worker_cancel: CancellationToken,
) -> Result<u64, TrackError> {
    let mut frames: u64 = 0;

    while let Some(msg) = media.recv().await {
        let frame = match msg {
            ChannelMessage::Frame(frame) => frame,
            ChannelMessage::Estimate(text) => {
                warn!(?text, "unexpected estimate on the receiving side");
                continue;
            }
        };

        debug!(timestamp = frame.timestamp, "frame ingested");
        queue.push(frame);
        frames += 1;

        // Non-blocking poll: if the worker has finished a cycle since
        // the last check, forward its result now.
        if let Some(estimate) = mailbox.take() {
            media
                .send(ChannelMessage::Estimate(estimate.encode()))
                .await?;
        }
    }

    info!(frames, "media stream ended, tearing down worker");
    worker_cancel.cancel();
    Ok(frames)
}
