//! Framed media channel between the peers.
//!
//! One bidirectional TCP connection carries frames (sender → receiver)
//! and estimate messages (receiver → sender), each as a
//! length-prefixed bincode frame. Reader and writer run as background
//! tasks bridged to the caller by mpsc channels.

use std::net::SocketAddr;

use bytes::{Buf, BufMut, BytesMut};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::codec::{Decoder, Encoder, Framed};
use tracing::warn;

use crate::error::TrackError;
use crate::frame::FramePacket;

/// Upper bound on one media frame (a 640×480 grayscale raster is
/// ~300 KiB; leave generous headroom for larger arenas).
pub const MAX_MEDIA_FRAME: usize = 16 * 1024 * 1024;

const LEN_PREFIX: usize = 4;

// ── ChannelMessage ───────────────────────────────────────────────

/// Everything that travels over the established media channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelMessage {
    /// A media frame with its tick (sender → receiver).
    Frame(FramePacket),
    /// A tab-delimited estimate message (receiver → sender).
    Estimate(String),
}

// ── MediaCodec ───────────────────────────────────────────────────

/// Length-prefixed bincode framing: `u32` big-endian payload length,
/// then the serialized [`ChannelMessage`].
#[derive(Debug, Default)]
pub struct MediaCodec;

impl Decoder for MediaCodec {
    type Item = ChannelMessage;
    type Error = TrackError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < LEN_PREFIX {
            return Ok(None);
        }
        let len = u32::from_be_bytes([src[0], src[1], src[2], src[3]]) as usize;
        if len > MAX_MEDIA_FRAME {
            return Err(TrackError::MediaFrameTooLarge {
                size: len,
                max: MAX_MEDIA_FRAME,
            });
        }
        if src.len() < LEN_PREFIX + len {
            src.reserve(LEN_PREFIX + len - src.len());
            return Ok(None);
        }

        src.advance(LEN_PREFIX);
        let payload = src.split_to(len);
        let msg = bincode::deserialize(&payload)?;
        Ok(Some(msg))
    }
}

impl Encoder<ChannelMessage> for MediaCodec {
    type Error = TrackError;

    fn encode(&mut self, item: ChannelMessage, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let payload = bincode::serialize(&item)?;
        if payload.len() > MAX_MEDIA_FRAME {
            return Err(TrackError::MediaFrameTooLarge {
                size: payload.len(),
                max: MAX_MEDIA_FRAME,
            });
        }
        dst.reserve(LEN_PREFIX + payload.len());
        dst.put_u32(payload.len() as u32);
        dst.extend_from_slice(&payload);
        Ok(())
    }
}

// ── MediaConnection ──────────────────────────────────────────────

/// Cloneable handle for sending on a media connection from another
/// task.
pub type MediaSender = mpsc::Sender<ChannelMessage>;

/// A media connection to the single peer.
#[derive(Debug)]
pub struct MediaConnection {
    // Channel to the background writer task
    tx: mpsc::Sender<ChannelMessage>,
    // Channel from the background reader task
    rx: mpsc::Receiver<ChannelMessage>,
    // Reader task handle; aborted on drop so its socket half is
    // released and the peer observes end-of-stream
    reader: JoinHandle<()>,
}

impl MediaConnection {
    pub fn new(stream: TcpStream) -> Self {
        let (mut net_writer, mut net_reader) = Framed::new(stream, MediaCodec).split();

        // User -> Network
        let (user_tx, mut network_rx) = mpsc::channel::<ChannelMessage>(100);

        // Network -> User
        let (network_tx, user_rx) = mpsc::channel(100);

        // Writer task
        tokio::spawn(async move {
            while let Some(msg) = network_rx.recv().await {
                if let Err(e) = net_writer.send(msg).await {
                    warn!("media write error: {e}");
                    return;
                }
            }
            // All senders dropped: flush and shut down the write half
            // so the peer's reader sees end-of-stream.
            if let Err(e) = net_writer.close().await {
                warn!("media close error: {e}");
            }
        });

        // Reader task
        let reader = tokio::spawn(async move {
            while let Some(result) = net_reader.next().await {
                match result {
                    Ok(msg) => {
                        if network_tx.send(msg).await.is_err() {
                            // user_rx was dropped, stop reading
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("media read error: {e}");
                        break;
                    }
                }
            }
        });

        Self {
            tx: user_tx,
            rx: user_rx,
            reader,
        }
    }

    pub async fn connect(addr: SocketAddr) -> Result<Self, TrackError> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream))
    }

    pub async fn send(&self, msg: ChannelMessage) -> Result<(), TrackError> {
        Ok(self.tx.send(msg).await?)
    }

    /// Next inbound message. `None` means end-of-stream: the peer
    /// disconnected or the reader task stopped.
    pub async fn recv(&mut self) -> Option<ChannelMessage> {
        self.rx.recv().await
    }

    pub fn sender_handle(&self) -> MediaSender {
        self.tx.clone()
    }
}

impl Drop for MediaConnection {
    fn drop(&mut self) {
        // The reader may be parked in `next()` holding its half of the
        // socket; nothing can consume from it anymore, so stop it.
        self.reader.abort();
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Image;

    #[test]
    fn codec_round_trip() {
        let mut codec = MediaCodec;
        let mut buf = BytesMut::new();

        let frame = ChannelMessage::Frame(FramePacket::new(Image::new(8, 8), 42));
        let estimate = ChannelMessage::Estimate("1\t2\t3".to_string());

        codec.encode(frame.clone(), &mut buf).unwrap();
        codec.encode(estimate.clone(), &mut buf).unwrap();

        assert_eq!(codec.decode(&mut buf).unwrap(), Some(frame));
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(estimate));
        assert!(buf.is_empty());
    }

    #[test]
    fn decode_waits_for_full_frame() {
        let mut codec = MediaCodec;
        let mut buf = BytesMut::new();
        codec
            .encode(ChannelMessage::Estimate("x".into()), &mut buf)
            .unwrap();

        let mut partial = buf.split_to(buf.len() - 1);
        assert!(codec.decode(&mut partial).unwrap().is_none());

        partial.unsplit(buf);
        assert!(codec.decode(&mut partial).unwrap().is_some());
    }

    #[test]
    fn oversized_length_prefix_is_an_error() {
        let mut codec = MediaCodec;
        let mut buf = BytesMut::new();
        buf.put_u32(u32::MAX);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(TrackError::MediaFrameTooLarge { .. })
        ));
    }
}
