pub mod lifecycle_tests;

use duet_core::{ClientMessage, RelayMessage, RoomCode};
use duet_peer::{
    MediaSource, PeerSession, SessionConfig, SessionEvent, SessionHandle, SessionSnapshot,
    SinkSlot, SyntheticMediaSource,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::Level;

use crate::utils::{MockConnectionFactory, RelayEnd, SIGNAL_TIMEOUT_MS, mock_channel};

pub const ROOM: &str = "AB12";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub struct TestSession {
    pub handle: SessionHandle,
    pub events: mpsc::UnboundedReceiver<SessionEvent>,
    pub relay: RelayEnd,
    pub connections: MockConnectionFactory,
    pub local_sink: SinkSlot,
    pub remote_sink: SinkSlot,
    pub task: JoinHandle<()>,
}

pub fn spawn_session(config: SessionConfig, media: Arc<dyn MediaSource>) -> TestSession {
    let (channel, relay) = mock_channel();
    let connections = MockConnectionFactory::new();
    let local_sink = SinkSlot::new();
    let remote_sink = SinkSlot::new();

    let (session, handle, events) =
        PeerSession::new(config, channel, Arc::new(connections.clone()), media);
    let task = session
        .with_sinks(Arc::new(local_sink.clone()), Arc::new(remote_sink.clone()))
        .spawn();

    TestSession {
        handle,
        events,
        relay,
        connections,
        local_sink,
        remote_sink,
        task,
    }
}

/// A session that has joined `ROOM` and is waiting for its peer.
pub async fn joined_session(config: SessionConfig) -> TestSession {
    let mut s = spawn_session(config, Arc::new(SyntheticMediaSource::new()));
    s.handle.join(ROOM).await.expect("join failed");
    assert_eq!(
        s.relay.next().await,
        ClientMessage::JoinRoom(RoomCode::from(ROOM))
    );
    s
}

/// A joined session that received `ready` and sent its first offer.
pub async fn initiator_session(config: SessionConfig) -> (TestSession, ClientMessage) {
    let mut s = joined_session(config).await;
    s.relay.deliver(RelayMessage::Ready);
    let offer = s.relay.next().await;
    assert!(matches!(offer, ClientMessage::Offer(_)), "got {:?}", offer);
    (s, offer)
}

/// A joined session that answered a remote offer.
pub async fn responder_session(config: SessionConfig) -> (TestSession, ClientMessage) {
    let mut s = joined_session(config).await;
    s.relay.deliver(crate::utils::offer_msg("remote-offer"));
    let answer = s.relay.next().await;
    assert!(matches!(answer, ClientMessage::Answer(_)), "got {:?}", answer);
    (s, answer)
}

impl TestSession {
    pub async fn wait_for<F>(&self, f: F) -> SessionSnapshot
    where
        F: FnMut(&SessionSnapshot) -> bool,
    {
        tokio::time::timeout(
            Duration::from_millis(SIGNAL_TIMEOUT_MS),
            self.handle.wait_for(f),
        )
        .await
        .expect("Timeout waiting for session snapshot")
        .expect("Session ended before reaching the expected snapshot")
    }

    /// Skips events until one matches `pred`.
    pub async fn next_event(&mut self, pred: impl Fn(&SessionEvent) -> bool) -> SessionEvent {
        loop {
            let event = tokio::time::timeout(
                Duration::from_millis(SIGNAL_TIMEOUT_MS),
                self.events.recv(),
            )
            .await
            .expect("Timeout waiting for session event")
            .expect("Session event channel closed");
            if pred(&event) {
                return event;
            }
        }
    }

    /// Waits for the actor to exit.
    pub async fn finished(self) {
        tokio::time::timeout(Duration::from_millis(SIGNAL_TIMEOUT_MS), self.task)
            .await
            .expect("Session did not finish")
            .expect("Session task panicked");
    }
}

/// Polls `f` until it holds.
pub async fn eventually(mut f: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_millis(SIGNAL_TIMEOUT_MS), async {
        while !f() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("Condition never held");
}
