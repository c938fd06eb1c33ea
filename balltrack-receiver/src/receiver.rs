//! Receiver service: answers the offer, ingests the frame stream, and
//! reports detection estimates.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use balltrack_core::{
    DetectionWorker, FrameQueue, GridDetector, MediaConnection, ResultMailbox, Role, Session,
    SignalConnection, TrackError, run_ingestion,
};

use crate::config::ReceiverConfig;

/// The answering peer. The event loop handles signaling and frame
/// ingestion; detection runs on its own worker task.
pub struct Receiver {
    config: ReceiverConfig,
}

impl Receiver {
    pub fn new(config: ReceiverConfig) -> Self {
        Self { config }
    }

    /// Establish one session, run it to end-of-stream, and return.
    pub async fn run(&self) -> Result<(), TrackError> {
        let signal_addr: SocketAddr = self
            .config
            .network
            .signal_addr
            .parse()
            .map_err(|_| TrackError::Other(format!(
                "invalid signal_addr {:?}",
                self.config.network.signal_addr
            )))?;

        // The sender may not be up yet; keep dialing.
        let retry = Duration::from_millis(self.config.network.dial_retry_ms.max(1));
        let signal = SignalConnection::connect_retry(signal_addr, retry).await;
        info!(%signal_addr, "signaling connected");

        let mut session = Session::new(Role::Answerer, signal);
        while !session.is_open() {
            if !session.consume_signal().await? {
                info!("session closed before opening");
                return Ok(());
            }
        }

        let media_addr = session
            .remote_media_addr()
            .ok_or(TrackError::ProtocolViolation(
                "offer carried no media address",
            ))?;
        let mut media = MediaConnection::connect(media_addr).await?;
        info!(%media_addr, "media connected, session open");

        // Pipeline wiring: queue and mailbox are the only state shared
        // with the worker.
        let queue = Arc::new(FrameQueue::new(self.config.pipeline.queue_capacity));
        let mailbox = Arc::new(ResultMailbox::new());
        let cancel = CancellationToken::new();

        let detector = GridDetector::new(self.config.detector_config());
        let worker = DetectionWorker::new(
            Arc::clone(&queue),
            Arc::clone(&mailbox),
            Box::new(detector),
            cancel.clone(),
        )
        .spawn();

        let frames = run_ingestion(&mut media, Arc::clone(&queue), mailbox, cancel).await?;
        info!(
            frames,
            dropped = queue.dropped(),
            "stream ended"
        );

        if let Err(e) = worker.await {
            warn!("worker join failed: {e}");
        }

        // Best effort: tell the sender we are gone.
        if let Err(e) = session.send_bye().await {
            warn!("could not send goodbye: {e}");
        }
        Ok(())
    }
}
