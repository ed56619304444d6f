use duet_peer::{
    Link, SessionConfig, SessionError, SessionState, SyntheticMediaSource, TrackKind,
};
use std::sync::Arc;

use crate::integration::{TestSession, init_tracing, initiator_session, spawn_session};
use crate::utils::{ConnectionCall, MockFailures, answer_msg};

async fn live_session() -> TestSession {
    let (s, _offer) = initiator_session(SessionConfig::default()).await;
    s.relay.deliver(answer_msg("remote-answer"));
    s.connections.go_live();
    s.wait_for(|snap| snap.state == SessionState::Connected(Link::Live))
        .await;
    s
}

#[tokio::test]
async fn test_toggles_flip_flags_without_renegotiating() {
    init_tracing();

    let mut s = live_session().await;
    let calls_before = s.connections.calls().len();

    assert!(!s.handle.toggle_mic().await.unwrap());
    assert!(!s.handle.toggle_camera().await.unwrap());

    let snap = s.handle.snapshot();
    assert!(!snap.mic_enabled);
    assert!(!snap.camera_enabled);
    assert_eq!(snap.local_tracks, 2);

    assert!(s.handle.toggle_mic().await.unwrap());
    assert!(s.handle.snapshot().mic_enabled);

    s.relay.expect_silence(200).await;
    assert_eq!(s.connections.calls().len(), calls_before);
    assert_eq!(s.handle.state(), SessionState::Connected(Link::Live));
}

#[tokio::test]
async fn test_toggle_without_media_reports_missing_track() {
    init_tracing();

    let s = spawn_session(
        SessionConfig::default(),
        Arc::new(SyntheticMediaSource::new()),
    );

    let err = s.handle.toggle_mic().await.unwrap_err();
    assert!(matches!(err, SessionError::NoTrack(TrackKind::Audio)));
}

#[tokio::test]
async fn test_refresh_camera_replaces_sender_track() {
    init_tracing();

    let mut s = live_session().await;
    let before = s.local_sink.current().unwrap();

    s.handle.refresh_camera().await.unwrap();

    let replaced = s
        .connections
        .calls()
        .into_iter()
        .find_map(|c| match c {
            ConnectionCall::ReplaceTrack { old, new } => Some((old, new)),
            _ => None,
        })
        .expect("camera track was not replaced");
    assert_ne!(replaced.0, replaced.1);
    assert!(replaced.0.starts_with("video-"));

    let after = s.local_sink.current().unwrap();
    assert!(before.track_ids.contains(&replaced.0));
    assert!(after.track_ids.contains(&replaced.1));
    assert!(!after.track_ids.contains(&replaced.0));

    s.relay.expect_silence(200).await;
    assert_eq!(s.connections.count(|c| *c == ConnectionCall::CreateOffer), 1);
    assert_eq!(s.handle.snapshot().local_tracks, 2);
}

#[tokio::test]
async fn test_failed_replacement_keeps_old_track() {
    init_tracing();

    let s = live_session().await;
    let before = s.local_sink.current().unwrap();
    s.connections.fail(MockFailures {
        replace_track: true,
        ..Default::default()
    });

    let err = s.handle.refresh_camera().await.unwrap_err();
    assert!(matches!(err, SessionError::TrackReplacement(_)));

    assert_eq!(s.local_sink.current(), Some(before));
    assert_eq!(s.handle.state(), SessionState::Connected(Link::Live));
}
