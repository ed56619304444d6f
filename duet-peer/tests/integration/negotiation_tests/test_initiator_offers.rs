use duet_core::{ClientMessage, RelayMessage, RoomCode};
use duet_peer::{Link, Role, SessionConfig, SessionState};

use crate::integration::{ROOM, init_tracing, initiator_session};
use crate::utils::{ConnectionCall, answer_msg, description_of, offer_msg};

#[tokio::test]
async fn test_ready_makes_exactly_one_offer() {
    init_tracing();

    let (mut s, offer) = initiator_session(SessionConfig::default()).await;

    let ClientMessage::Offer(routed) = &offer else {
        unreachable!()
    };
    assert_eq!(routed.room, RoomCode::from(ROOM));
    assert_eq!(description_of(&offer).sdp, "mock-offer-1");

    // Both attached tracks raised negotiation-needed; only one offer results.
    s.relay.expect_silence(200).await;
    assert_eq!(s.connections.count(|c| *c == ConnectionCall::CreateOffer), 1);
    assert_eq!(
        s.connections
            .count(|c| matches!(c, ConnectionCall::AddTrack(_))),
        2
    );

    let snap = s.wait_for(|snap| snap.state == SessionState::Negotiating).await;
    assert_eq!(snap.role, Some(Role::Initiator));
    assert!(!snap.remote_description_set);
}

#[tokio::test]
async fn test_answer_then_link_goes_live() {
    init_tracing();

    let (mut s, _offer) = initiator_session(SessionConfig::default()).await;

    s.relay.deliver(answer_msg("remote-answer"));
    let snap = s
        .wait_for(|snap| snap.state == SessionState::Connected(Link::Pending))
        .await;
    assert!(snap.remote_description_set);

    s.connections.go_live();
    let snap = s
        .wait_for(|snap| snap.state == SessionState::Connected(Link::Live))
        .await;
    assert!(snap.peer_connected);

    s.relay.expect_silence(200).await;
    assert_eq!(s.connections.count(|c| *c == ConnectionCall::CreateOffer), 1);
}

#[tokio::test]
async fn test_second_ready_is_ignored() {
    init_tracing();

    let (mut s, _offer) = initiator_session(SessionConfig::default()).await;

    s.relay.deliver(RelayMessage::Ready);
    s.relay.expect_silence(200).await;

    assert_eq!(s.connections.created(), 1);
    assert_eq!(s.handle.state(), SessionState::Negotiating);
}

#[tokio::test]
async fn test_initiator_ignores_incoming_offer() {
    init_tracing();

    let (mut s, _offer) = initiator_session(SessionConfig::default()).await;

    s.relay.deliver(offer_msg("colliding-offer"));
    s.relay.expect_silence(200).await;

    assert_eq!(s.connections.count(|c| *c == ConnectionCall::CreateAnswer), 0);
    assert!(
        s.connections
            .position(|c| matches!(c, ConnectionCall::SetRemote(_)))
            .is_none()
    );
    assert_eq!(s.handle.state(), SessionState::Negotiating);
}
