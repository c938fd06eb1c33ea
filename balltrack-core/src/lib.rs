//! # balltrack-core
//!
//! Core library for the balltrack peer-to-peer tracking exercise: a
//! sender streams a synthetically generated bouncing ball to a
//! receiver, the receiver estimates the ball's on-screen position per
//! frame, and the estimate travels back for accuracy scoring.
//!
//! This crate contains:
//! - **Motion**: `BallState` — deterministic reflective-bounce integrator and disc rasterizer
//! - **Ledger**: `GroundTruthLedger` — timestamp → true position map with Euclidean scoring
//! - **Pipeline**: `FrameQueue`, `ResultMailbox`, `DetectionWorker`, `run_ingestion`
//! - **Detection**: `Detector` trait and the default `GridDetector`
//! - **Handshake**: `Handshake` / `HandshakePhase` — offer/answer session state machine
//! - **Signaling**: `SignalMessage`, `SignalCodec`, `SignalConnection`, `Session`
//! - **Media**: `ChannelMessage`, `MediaCodec`, `MediaConnection` for framed frame/estimate I/O
//! - **Error**: `TrackError` — typed, `thiserror`-based error hierarchy

pub mod detect;
pub mod error;
pub mod estimate;
pub mod frame;
pub mod handshake;
pub mod ledger;
pub mod mailbox;
pub mod media;
pub mod motion;
pub mod pipeline;
pub mod queue;
pub mod session;
pub mod signal;
pub mod worker;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use detect::{Detector, DetectorConfig, GridDetector};
pub use error::TrackError;
pub use estimate::Estimate;
pub use frame::{FramePacket, Image, Point};
pub use handshake::{Handshake, HandshakePhase, Role};
pub use ledger::GroundTruthLedger;
pub use mailbox::ResultMailbox;
pub use media::{ChannelMessage, MediaCodec, MediaConnection, MediaSender};
pub use motion::BallState;
pub use pipeline::run_ingestion;
pub use queue::FrameQueue;
pub use session::Session;
pub use signal::{DescriptionKind, SignalCodec, SignalConnection, SignalMessage};
pub use worker::DetectionWorker;
