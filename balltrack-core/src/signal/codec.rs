//! Line-delimited JSON codec and framed connection for signaling.

use std::net::SocketAddr;
use std::time::Duration;

use bytes::{BufMut, BytesMut};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::{Decoder, Encoder, Framed};
use tracing::debug;

use crate::error::TrackError;
use crate::signal::SignalMessage;

/// Upper bound on one signaling line. Descriptions are tiny; anything
/// bigger is a framing bug or garbage on the socket.
pub const MAX_SIGNAL_FRAME: usize = 64 * 1024;

// ── SignalCodec ──────────────────────────────────────────────────

/// One JSON object per `\n`-terminated line.
#[derive(Debug, Default)]
pub struct SignalCodec;

impl Decoder for SignalCodec {
    type Item = SignalMessage;
    type Error = TrackError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(newline) = src.iter().position(|&b| b == b'\n') else {
            if src.len() > MAX_SIGNAL_FRAME {
                return Err(TrackError::SignalFrameTooLarge {
                    size: src.len(),
                    max: MAX_SIGNAL_FRAME,
                });
            }
            return Ok(None);
        };

        let line = src.split_to(newline + 1);
        let msg = serde_json::from_slice(&line[..newline])?;
        Ok(Some(msg))
    }
}

impl Encoder<SignalMessage> for SignalCodec {
    type Error = TrackError;

    fn encode(&mut self, item: SignalMessage, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let json = serde_json::to_vec(&item)?;
        dst.reserve(json.len() + 1);
        dst.extend_from_slice(&json);
        dst.put_u8(b'\n');
        Ok(())
    }
}

// ── SignalConnection ─────────────────────────────────────────────

/// A framed signaling connection to the peer.
pub struct SignalConnection {
    framed: Framed<TcpStream, SignalCodec>,
}

impl SignalConnection {
    pub fn new(stream: TcpStream) -> Self {
        Self {
            framed: Framed::new(stream, SignalCodec),
        }
    }

    /// Dial the peer's signaling endpoint, retrying until it exists.
    ///
    /// The initial rendezvous may happen before the peer process has
    /// started listening; connection refusals here are transient noise,
    /// not errors.
    pub async fn connect_retry(addr: SocketAddr, retry_interval: Duration) -> Self {
        loop {
            match TcpStream::connect(addr).await {
                Ok(stream) => return Self::new(stream),
                Err(e) => {
                    debug!("signaling peer not reachable yet ({e}), retrying");
                    tokio::time::sleep(retry_interval).await;
                }
            }
        }
    }

    pub async fn send(&mut self, msg: SignalMessage) -> Result<(), TrackError> {
        self.framed.send(msg).await
    }

    /// Next signaling message, or `None` when the peer closed the
    /// stream without a Bye.
    pub async fn recv(&mut self) -> Result<Option<SignalMessage>, TrackError> {
        self.framed.next().await.transpose()
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::DescriptionKind;

    #[test]
    fn decode_waits_for_a_full_line() {
        let mut codec = SignalCodec;
        let mut buf = BytesMut::from(&b"{\"type\":\"bye\""[..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"}\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(SignalMessage::Bye));
        assert!(buf.is_empty());
    }

    #[test]
    fn decode_two_lines_in_one_buffer() {
        let mut codec = SignalCodec;
        let mut buf = BytesMut::new();
        codec.encode(SignalMessage::Bye, &mut buf).unwrap();
        codec.encode(SignalMessage::answer(), &mut buf).unwrap();

        assert_eq!(codec.decode(&mut buf).unwrap(), Some(SignalMessage::Bye));
        match codec.decode(&mut buf).unwrap() {
            Some(SignalMessage::Description { kind, media_addr }) => {
                assert_eq!(kind, DescriptionKind::Answer);
                assert!(media_addr.is_none());
            }
            other => panic!("unexpected decode: {other:?}"),
        }
    }

    #[test]
    fn decode_rejects_garbage() {
        let mut codec = SignalCodec;
        let mut buf = BytesMut::from(&b"not json\n"[..]);
        assert!(codec.decode(&mut buf).is_err());
    }

    #[test]
    fn oversized_line_is_an_error() {
        let mut codec = SignalCodec;
        let mut buf = BytesMut::from(vec![b'x'; MAX_SIGNAL_FRAME + 1].as_slice());
        assert!(matches!(
            codec.decode(&mut buf),
            Err(TrackError::SignalFrameTooLarge { .. })
        ));
    }
}
