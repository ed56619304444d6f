use duet_core::{ConnectionId, RelayMessage, RoomCode};

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::assert_no_delivery;

#[tokio::test]
async fn test_disconnect_removes_member_without_notifying() {
    init_tracing();

    let (relay, _output, mut rx) = create_test_relay();
    let code = RoomCode::from("AB12");
    let first = ConnectionId::new();
    let second = ConnectionId::new();

    relay.join(&first, code.clone()).await;
    relay.join(&second, code.clone()).await;
    assert_eq!(rx.recv().await.map(|d| d.msg), Some(RelayMessage::Ready));

    relay.disconnect(&second).await;

    assert_eq!(relay.registry().members(&code), vec![first]);
    assert_no_delivery(&mut rx, 100).await;
}

#[tokio::test]
async fn test_last_leave_drops_room() {
    init_tracing();

    let (relay, _output, _rx) = create_test_relay();
    let code = RoomCode::from("AB12");
    let first = ConnectionId::new();

    relay.join(&first, code.clone()).await;
    assert_eq!(relay.registry().room_count(), 1);

    relay.disconnect(&first).await;
    assert_eq!(relay.registry().room_count(), 0);

    // Disconnecting twice is harmless.
    relay.disconnect(&first).await;
}

#[tokio::test]
async fn test_room_recreated_after_drop_pairs_again() {
    init_tracing();

    let (relay, output, _rx) = create_test_relay();
    let code = RoomCode::from("AB12");
    let a = ConnectionId::new();
    let b = ConnectionId::new();

    relay.join(&a, code.clone()).await;
    relay.join(&b, code.clone()).await;
    relay.disconnect(&a).await;
    relay.disconnect(&b).await;

    let c = ConnectionId::new();
    relay.join(&c, code.clone()).await;
    relay.join(&ConnectionId::new(), code).await;

    assert_eq!(output.count_ready().await, 2);
    assert_eq!(output.deliveries_to(&c).await, vec![RelayMessage::Ready]);
}
