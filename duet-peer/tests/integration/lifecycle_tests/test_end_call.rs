use duet_peer::{Link, SessionConfig, SessionEvent, SessionState, SyntheticMediaSource};
use std::sync::Arc;
use std::time::Duration;

use crate::integration::{init_tracing, initiator_session, joined_session, spawn_session};
use crate::utils::{ConnectionCall, answer_msg, candidate_msg};

#[tokio::test]
async fn test_end_call_releases_everything() {
    init_tracing();

    let (mut s, _offer) = initiator_session(SessionConfig::default()).await;
    s.relay.deliver(answer_msg("remote-answer"));
    s.connections.go_live();
    s.wait_for(|snap| snap.state == SessionState::Connected(Link::Live))
        .await;
    assert!(s.local_sink.is_attached());

    s.handle.end_call().await.unwrap();

    let snap = s.handle.snapshot();
    assert_eq!(snap.state, SessionState::Closed);
    assert_eq!(snap.local_tracks, 0);
    assert_eq!(snap.buffered_candidates, 0);
    assert!(!snap.remote_description_set);
    assert!(!s.local_sink.is_attached());
    assert!(!s.remote_sink.is_attached());

    let calls = s.connections.calls();
    let removed = calls
        .iter()
        .filter(|c| matches!(c, ConnectionCall::RemoveTrack(_)))
        .count();
    assert_eq!(removed, 2);
    assert_eq!(calls.last(), Some(&ConnectionCall::Close));

    s.next_event(|e| *e == SessionEvent::CallEnded).await;

    // A second hang-up is harmless.
    s.handle.end_call().await.unwrap();
    s.finished().await;
}

#[tokio::test]
async fn test_end_call_drops_buffered_candidates() {
    init_tracing();

    let s = joined_session(SessionConfig::default()).await;
    s.relay.deliver(candidate_msg("c1"));
    s.relay.deliver(candidate_msg("c2"));
    s.wait_for(|snap| snap.buffered_candidates == 2).await;

    s.handle.end_call().await.unwrap();

    assert_eq!(s.handle.snapshot().buffered_candidates, 0);
    assert!(s.connections.applied_candidates().is_empty());
    s.finished().await;
}

#[tokio::test]
async fn test_end_call_before_join() {
    init_tracing();

    let mut s = spawn_session(
        SessionConfig::default(),
        Arc::new(SyntheticMediaSource::new()),
    );

    s.handle.end_call().await.unwrap();
    s.next_event(|e| *e == SessionEvent::CallEnded).await;

    assert_eq!(s.handle.state(), SessionState::Closed);
    assert_eq!(s.connections.created(), 0);
    s.finished().await;
}

#[tokio::test(start_paused = true)]
async fn test_hangup_delay_precedes_call_ended() {
    init_tracing();

    let config = SessionConfig {
        hangup_delay: Duration::from_secs(2),
        ..Default::default()
    };
    let mut s = joined_session(config).await;

    let started = tokio::time::Instant::now();
    s.handle.end_call().await.unwrap();
    assert!(started.elapsed() >= Duration::from_secs(2));

    // Resources are already gone when the delay starts.
    assert_eq!(s.handle.state(), SessionState::Closed);
    s.next_event(|e| *e == SessionEvent::CallEnded).await;
    s.finished().await;
}

#[tokio::test]
async fn test_dropping_handle_ends_call() {
    init_tracing();

    let s = joined_session(SessionConfig::default()).await;
    let crate::integration::TestSession {
        handle,
        mut events,
        task,
        ..
    } = s;

    drop(handle);

    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("session kept running without a handle")
        .unwrap();

    let mut ended = false;
    while let Ok(event) = events.try_recv() {
        ended |= event == SessionEvent::CallEnded;
    }
    assert!(ended);
}
