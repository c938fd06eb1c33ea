//! Integration tests — signaling handshake, media round-trips, and the
//! full ingestion pipeline over real TCP connections on localhost.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use balltrack_core::{
    BallState, ChannelMessage, DetectionWorker, Detector, Estimate, FrameQueue, FramePacket,
    GroundTruthLedger, HandshakePhase, Image, MediaConnection, Point, ResultMailbox, Role,
    Session, SignalConnection, run_ingestion,
};

// ── Helpers ──────────────────────────────────────────────────────

/// Spin up a listener on an OS-assigned port.
async fn ephemeral_listener() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// Detector stub that reports the frame's timestamp as a position, so
/// every estimate is traceable to its frame.
struct EchoDetector;

impl Detector for EchoDetector {
    fn detect(&self, image: &Image) -> Option<Point> {
        // timestamp is smuggled through the first pixel by the tests
        let tag = image.pixel(0, 0) as i32;
        Some(Point::new(tag, tag))
    }
}

fn tagged_frame(ts: i64) -> FramePacket {
    let mut img = Image::new(4, 4);
    img.set_pixel(0, 0, ts as u8);
    FramePacket::new(img, ts)
}

// ── Signaling handshake ──────────────────────────────────────────

#[tokio::test]
async fn test_offer_answer_handshake() {
    let (listener, signal_addr) = ephemeral_listener().await;
    let media_addr: SocketAddr = "127.0.0.1:9999".parse().unwrap();

    let answerer = tokio::spawn(async move {
        let conn = SignalConnection::connect_retry(signal_addr, Duration::from_millis(50)).await;
        let mut session = Session::new(Role::Answerer, conn);
        assert_eq!(session.phase(), HandshakePhase::AwaitingRemoteDescription);

        // offer arrives, answer goes out, session opens
        assert!(session.consume_signal().await.unwrap());
        assert!(session.is_open());
        assert_eq!(session.remote_media_addr(), Some("127.0.0.1:9999".parse().unwrap()));

        // goodbye: stop reported exactly once
        assert!(!session.consume_signal().await.unwrap());
        assert!(session.is_closed());
    });

    let (stream, _) = listener.accept().await.unwrap();
    let mut offerer = Session::new(Role::Offerer, SignalConnection::new(stream));
    offerer.offer(media_addr).await.unwrap();
    assert_eq!(offerer.phase(), HandshakePhase::LocalDescriptionSet);

    // the answer opens the offerer side
    assert!(offerer.consume_signal().await.unwrap());
    assert!(offerer.is_open());

    offerer.send_bye().await.unwrap();
    assert!(offerer.is_closed());

    tokio::time::timeout(Duration::from_secs(5), answerer)
        .await
        .expect("handshake timed out")
        .unwrap();
}

#[tokio::test]
async fn test_answerer_dial_retries_until_offerer_exists() {
    let (listener, signal_addr) = ephemeral_listener().await;
    drop(listener); // nobody listening yet

    let dialer = tokio::spawn(async move {
        SignalConnection::connect_retry(signal_addr, Duration::from_millis(20)).await
    });

    // let a few refusals happen, then start listening
    tokio::time::sleep(Duration::from_millis(100)).await;
    let listener = TcpListener::bind(signal_addr).await.unwrap();
    let accepted = listener.accept();

    let (conn, _) = tokio::join!(
        async {
            tokio::time::timeout(Duration::from_secs(5), dialer)
                .await
                .expect("dial never succeeded")
                .unwrap()
        },
        async {
            accepted.await.unwrap();
        }
    );
    drop(conn);
}

// ── Media channel ────────────────────────────────────────────────

#[tokio::test]
async fn test_media_frame_and_estimate_round_trip() {
    let (listener, addr) = ephemeral_listener().await;

    let client = tokio::spawn(async move { MediaConnection::connect(addr).await.unwrap() });
    let (stream, _) = listener.accept().await.unwrap();
    let mut server_conn = MediaConnection::new(stream);
    let mut client_conn = client.await.unwrap();

    // server streams a frame
    let frame = FramePacket::new(Image::new(16, 16), 7);
    server_conn
        .send(ChannelMessage::Frame(frame.clone()))
        .await
        .unwrap();

    let got = tokio::time::timeout(Duration::from_secs(5), client_conn.recv())
        .await
        .expect("timeout")
        .expect("stream ended");
    assert_eq!(got, ChannelMessage::Frame(frame));

    // client replies with an estimate
    client_conn
        .send(ChannelMessage::Estimate("42\t43\t7".into()))
        .await
        .unwrap();
    let reply = tokio::time::timeout(Duration::from_secs(5), server_conn.recv())
        .await
        .expect("timeout")
        .expect("stream ended");
    assert_eq!(reply, ChannelMessage::Estimate("42\t43\t7".into()));
}

#[tokio::test]
async fn test_media_disconnect_is_end_of_stream() {
    let (listener, addr) = ephemeral_listener().await;

    let client = tokio::spawn(async move { MediaConnection::connect(addr).await.unwrap() });
    let (stream, _) = listener.accept().await.unwrap();
    let mut server_conn = MediaConnection::new(stream);
    let client_conn = client.await.unwrap();

    drop(client_conn);

    let result = tokio::time::timeout(Duration::from_secs(5), server_conn.recv())
        .await
        .expect("timeout");
    assert!(result.is_none());
}

#[tokio::test]
async fn test_drop_flushes_queued_writes_before_end_of_stream() {
    let (listener, addr) = ephemeral_listener().await;

    let client = tokio::spawn(async move { MediaConnection::connect(addr).await.unwrap() });
    let (stream, _) = listener.accept().await.unwrap();
    let mut server_conn = MediaConnection::new(stream);
    let client_conn = client.await.unwrap();

    // Queue a message and immediately discard the handle: the message
    // must still reach the peer, followed by end-of-stream.
    client_conn
        .send(ChannelMessage::Estimate("1\t2\t3".into()))
        .await
        .unwrap();
    drop(client_conn);

    let first = tokio::time::timeout(Duration::from_secs(5), server_conn.recv())
        .await
        .expect("timeout")
        .expect("stream ended before delivering the queued message");
    assert_eq!(first, ChannelMessage::Estimate("1\t2\t3".into()));

    let end = tokio::time::timeout(Duration::from_secs(5), server_conn.recv())
        .await
        .expect("timeout");
    assert!(end.is_none());
}

// ── Pipeline end-to-end ──────────────────────────────────────────

#[tokio::test]
async fn test_ingestion_pipeline_end_to_end() {
    let (listener, addr) = ephemeral_listener().await;

    let receiver = tokio::spawn(async move {
        let mut media = MediaConnection::connect(addr).await.unwrap();
        let queue = Arc::new(FrameQueue::new(16));
        let mailbox = Arc::new(ResultMailbox::new());
        let cancel = CancellationToken::new();

        let worker = DetectionWorker::new(
            Arc::clone(&queue),
            Arc::clone(&mailbox),
            Box::new(EchoDetector),
            cancel.clone(),
        )
        .spawn();

        let frames = run_ingestion(&mut media, queue, mailbox, cancel.clone())
            .await
            .unwrap();
        assert!(cancel.is_cancelled());
        worker.await.unwrap();
        frames
    });

    let (stream, _) = listener.accept().await.unwrap();
    let mut sender_conn = MediaConnection::new(stream);

    // Stream frames slowly enough that the worker keeps up, so every
    // frame after the first produces a mailbox result for the next
    // ingestion cycle to pick up.
    const N: i64 = 10;
    let mut estimates = Vec::new();
    for ts in 0..N {
        sender_conn
            .send(ChannelMessage::Frame(tagged_frame(ts)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        while let Ok(Some(msg)) =
            tokio::time::timeout(Duration::from_millis(5), sender_conn.recv()).await
        {
            match msg {
                ChannelMessage::Estimate(text) => {
                    estimates.push(Estimate::parse(&text).unwrap())
                }
                other => panic!("unexpected message from receiver: {other:?}"),
            }
        }
    }
    drop(sender_conn); // end-of-stream

    let frames = tokio::time::timeout(Duration::from_secs(10), receiver)
        .await
        .expect("pipeline timed out")
        .unwrap();
    assert_eq!(frames, N as u64);

    // Estimates arrive in frame order, each matching its tagged frame.
    assert!(!estimates.is_empty());
    for est in &estimates {
        assert_eq!(est.x as i64, est.timestamp);
        assert_eq!(est.y as i64, est.timestamp);
    }
    for pair in estimates.windows(2) {
        assert!(pair[0].timestamp < pair[1].timestamp);
    }
}

// ── Sender-side scoring path ─────────────────────────────────────

#[tokio::test]
async fn test_ledger_scores_wire_estimates() {
    let mut ledger = GroundTruthLedger::new();
    let mut ball = BallState::new(5, 40, 100, 100);

    ledger.record(1000, ball.position()).unwrap();
    ball.advance();

    let est = Estimate::parse("42\t43\t1000").unwrap();
    let error = ledger.score(est.position(), est.timestamp).unwrap();
    assert!((error - 13.0_f64.sqrt()).abs() < 1e-9);
    assert!(!ledger.contains(1000));

    // a duplicate reply is reported, not a crash and not a stale value
    assert!(ledger.score(est.position(), est.timestamp).is_err());
}
