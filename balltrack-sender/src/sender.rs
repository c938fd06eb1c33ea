//! Sender service: offers a session, streams ball frames, and scores
//! the estimates that come back.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use balltrack_core::{
    BallState, ChannelMessage, Estimate, FramePacket, GroundTruthLedger, MediaConnection, Role,
    Session, SignalConnection, TrackError,
};

use crate::config::SenderConfig;

/// The offering peer. Owns the motion source and the ground-truth
/// ledger; everything runs on one event loop, no synchronization.
pub struct Sender {
    config: SenderConfig,
}

impl Sender {
    pub fn new(config: SenderConfig) -> Self {
        Self { config }
    }

    /// Listen for peers and serve one session at a time. A peer
    /// disconnect loops back to waiting for the next session; only a
    /// session-fatal signaling failure propagates out.
    pub async fn run(&self) -> Result<(), TrackError> {
        let net = &self.config.network;
        let signal_listener =
            TcpListener::bind((net.bind_host.as_str(), net.signal_port)).await?;
        let media_listener = TcpListener::bind((net.bind_host.as_str(), net.media_port)).await?;
        let media_addr: SocketAddr = media_listener.local_addr()?;
        info!(
            signal = %signal_listener.local_addr()?,
            media = %media_addr,
            "sender listening"
        );

        'sessions: loop {
            let (stream, peer) = signal_listener.accept().await?;
            info!(%peer, "signaling connection accepted");
            let mut session = Session::new(Role::Offerer, SignalConnection::new(stream));

            // Offerer transmits its description before reading anything.
            session.offer(media_addr).await?;
            while !session.is_open() {
                if !session.consume_signal().await? {
                    info!("session closed before opening; awaiting a new peer");
                    continue 'sessions;
                }
            }

            let (media_stream, _) = media_listener.accept().await?;
            let media = MediaConnection::new(media_stream);
            self.stream_session(&mut session, media).await?;
            info!("session ended; awaiting a new peer");
        }
    }

    /// Stream frames at the configured rate until the peer goes away,
    /// scoring estimate replies as they arrive.
    async fn stream_session(
        &self,
        session: &mut Session,
        mut media: MediaConnection,
    ) -> Result<(), TrackError> {
        let ball_cfg = &self.config.ball;
        let mut ball = BallState::new(
            ball_cfg.velocity,
            ball_cfg.radius,
            ball_cfg.width,
            ball_cfg.height,
        );
        let mut ledger = GroundTruthLedger::new();
        let mut timestamp: i64 = 0;

        let fps = self.config.stream.fps.max(1);
        let mut ticker = tokio::time::interval(Duration::from_secs_f64(1.0 / fps as f64));

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let image = ball.render();
                    ball.advance();
                    // Ground truth records the post-advance position for
                    // this tick; the paired detector is calibrated
                    // against exactly this pairing.
                    ledger.record(timestamp, ball.position())?;

                    let frame = ChannelMessage::Frame(FramePacket::new(image, timestamp));
                    match media.send(frame).await {
                        Ok(()) => {}
                        Err(TrackError::ChannelClosed) => {
                            info!("media channel closed mid-stream");
                            return Ok(());
                        }
                        Err(e) => return Err(e),
                    }

                    let evicted = ledger.prune(timestamp, self.config.stream.ledger_max_age_ticks);
                    if evicted > 0 {
                        debug!(evicted, pending = ledger.len(), "aged ground-truth entries evicted");
                    }
                    timestamp += 1;
                }

                msg = media.recv() => {
                    match msg {
                        Some(ChannelMessage::Estimate(text)) => {
                            Self::handle_estimate(&mut ledger, &text);
                        }
                        Some(ChannelMessage::Frame(_)) => {
                            warn!("unexpected frame from the receiving peer");
                        }
                        None => {
                            info!(frames = timestamp, "peer disconnected");
                            return Ok(());
                        }
                    }
                }

                more = session.consume_signal() => {
                    // Err here is session-fatal and takes the process
                    // down; a goodbye just ends this session.
                    if !more? {
                        info!("session closed by peer");
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Score one estimate reply. Malformed or unmatched estimates are
    /// logged and survived; they never abort the loop.
    fn handle_estimate(ledger: &mut GroundTruthLedger, text: &str) {
        let est = match Estimate::parse(text) {
            Ok(est) => est,
            Err(e) => {
                warn!("{e}");
                return;
            }
        };
        match ledger.score(est.position(), est.timestamp) {
            Ok(error) => info!(
                timestamp = est.timestamp,
                x = est.x,
                y = est.y,
                error_px = error,
                "estimate scored"
            ),
            Err(e) => warn!("unmatched estimate: {e}"),
        }
    }
}
