use duet_peer::{
    Link, NegotiationError, NegotiationStep, SessionConfig, SessionEvent, SessionState,
};
use serde_json::{Value, json};
use std::time::Duration;

use crate::integration::{init_tracing, initiator_session, joined_session};
use crate::utils::{ConnectionCall, MockFailures, answer_msg, candidate_msg, raw_offer};

fn failed_at(step: NegotiationStep) -> impl Fn(&SessionEvent) -> bool {
    move |event| {
        matches!(
            event,
            SessionEvent::NegotiationFailed(NegotiationError::Step { step: s, .. }) if *s == step
        )
    }
}

#[tokio::test]
async fn test_malformed_offer_fails_negotiation() {
    init_tracing();

    let mut s = joined_session(SessionConfig::default()).await;

    s.relay.deliver(raw_offer(json!({ "type": "offer", "sdp": 42 })));
    s.next_event(failed_at(NegotiationStep::ParseDescription))
        .await;

    let snap = s.handle.snapshot();
    assert_eq!(snap.state, SessionState::Closed);
    assert_eq!(snap.local_tracks, 0);
    assert!(!s.local_sink.is_attached());
    s.relay.expect_silence(100).await;
    s.finished().await;
}

#[tokio::test]
async fn test_null_payload_is_ignored() {
    init_tracing();

    let mut s = joined_session(SessionConfig::default()).await;

    s.relay.deliver(raw_offer(Value::Null));
    s.relay.expect_silence(200).await;

    assert_eq!(s.handle.state(), SessionState::WaitingForPeer);
    assert_eq!(s.connections.created(), 0);
}

#[tokio::test]
async fn test_rejected_answer_tears_down() {
    init_tracing();

    let (mut s, _offer) = initiator_session(SessionConfig::default()).await;
    s.connections.fail(MockFailures {
        set_remote: true,
        ..Default::default()
    });

    s.relay.deliver(answer_msg("bad-answer"));
    s.next_event(failed_at(NegotiationStep::SetRemoteDescription))
        .await;

    assert_eq!(s.handle.state(), SessionState::Closed);
    assert_eq!(s.connections.count(|c| *c == ConnectionCall::Close), 1);
    s.finished().await;
}

#[tokio::test]
async fn test_rejected_candidate_fails_negotiation() {
    init_tracing();

    let (mut s, _offer) = initiator_session(SessionConfig::default()).await;
    s.relay.deliver(answer_msg("remote-answer"));
    s.wait_for(|snap| snap.state == SessionState::Connected(Link::Pending))
        .await;

    s.connections.fail(MockFailures {
        add_candidate: true,
        ..Default::default()
    });
    s.relay.deliver(candidate_msg("garbage"));
    s.next_event(failed_at(NegotiationStep::AddCandidate)).await;

    assert_eq!(s.handle.state(), SessionState::Closed);
    s.finished().await;
}

#[tokio::test]
async fn test_connection_refused_on_ready() {
    init_tracing();

    let mut s = joined_session(SessionConfig::default()).await;
    s.connections.fail(MockFailures {
        create: true,
        ..Default::default()
    });

    s.relay.deliver(duet_core::RelayMessage::Ready);
    s.next_event(failed_at(NegotiationStep::CreateConnection))
        .await;

    assert_eq!(s.handle.state(), SessionState::Closed);
    s.finished().await;
}

#[tokio::test(start_paused = true)]
async fn test_unanswered_offer_times_out() {
    init_tracing();

    let config = SessionConfig {
        negotiation_timeout: Duration::from_secs(2),
        ..Default::default()
    };
    let (mut s, _offer) = initiator_session(config).await;

    let event = s
        .next_event(|e| matches!(e, SessionEvent::NegotiationFailed(_)))
        .await;
    assert_eq!(
        event,
        SessionEvent::NegotiationFailed(NegotiationError::Timeout(Duration::from_secs(2)))
    );

    assert_eq!(s.handle.state(), SessionState::Closed);
    assert_eq!(s.connections.count(|c| *c == ConnectionCall::Close), 1);
    s.finished().await;
}

#[tokio::test(start_paused = true)]
async fn test_live_call_has_no_deadline() {
    init_tracing();

    let config = SessionConfig {
        negotiation_timeout: Duration::from_secs(2),
        ..Default::default()
    };
    let (mut s, _offer) = initiator_session(config).await;
    s.relay.deliver(answer_msg("remote-answer"));
    s.connections.go_live();
    s.wait_for(|snap| snap.state == SessionState::Connected(Link::Live))
        .await;

    tokio::time::sleep(Duration::from_secs(60)).await;

    assert_eq!(s.handle.state(), SessionState::Connected(Link::Live));
    while let Ok(event) = s.events.try_recv() {
        assert!(
            !matches!(event, SessionEvent::NegotiationFailed(_)),
            "unexpected {:?}",
            event
        );
    }
}
