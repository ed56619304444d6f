use duet_core::{ClientMessage, ConnectionId, RoomCode, SessionDescription};

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::assert_no_delivery;

#[tokio::test]
async fn test_sender_never_receives_own_message() {
    init_tracing();

    let (relay, output, _rx) = create_test_relay();
    let code = RoomCode::from("AB12");
    let first = ConnectionId::new();
    let second = ConnectionId::new();

    relay.join(&first, code.clone()).await;
    relay.join(&second, code.clone()).await;

    let answer = SessionDescription::answer("v=0");
    relay
        .handle(&second, ClientMessage::answer(code, &answer).unwrap())
        .await;

    assert!(output.deliveries_to(&second).await.is_empty());
    assert_eq!(output.deliveries_to(&first).await.len(), 2);
}

#[tokio::test]
async fn test_lone_member_message_is_dropped() {
    init_tracing();

    let (relay, _output, mut rx) = create_test_relay();
    let code = RoomCode::from("AB12");
    let first = ConnectionId::new();

    relay.join(&first, code.clone()).await;

    let offer = SessionDescription::offer("v=0");
    relay
        .handle(&first, ClientMessage::offer(code, &offer).unwrap())
        .await;

    assert_no_delivery(&mut rx, 100).await;
}

#[tokio::test]
async fn test_message_for_unknown_room_is_dropped() {
    init_tracing();

    let (relay, _output, mut rx) = create_test_relay();
    let offer = SessionDescription::offer("v=0");

    relay
        .handle(
            &ConnectionId::new(),
            ClientMessage::offer(RoomCode::from("NOPE"), &offer).unwrap(),
        )
        .await;

    assert_no_delivery(&mut rx, 100).await;
    assert_eq!(relay.registry().room_count(), 0);
}
