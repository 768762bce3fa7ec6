use std::sync::Arc;

use serde_json::json;
use stanza_client::{SignalingChannel, SocketIoChannel};
use stanza_core::{NegotiationMessage, PeerId, RelayCommand, RelayEvent, RoomId};

use super::RecordingObserver;
use crate::integration::init_tracing;
use crate::utils::{MockRelay, RELAY_TIMEOUT_MS, wait_until};

async fn join(relay: &MockRelay, peer: &str) -> (SocketIoChannel, RecordingObserver) {
    let observer = RecordingObserver::default();
    let mut channel = SocketIoChannel::new(relay.relay_config(peer), PeerId::from(peer));
    channel
        .connect(Arc::new(observer.clone()))
        .await
        .expect("connect failed");
    channel.send(RelayCommand::CreateOrJoin(RoomId::from("lobby")));
    (channel, observer)
}

#[tokio::test]
async fn test_second_peer_joins_third_is_full() {
    init_tracing();

    let relay = MockRelay::start().await.expect("relay should start");

    let (mut first, first_events) = join(&relay, "alpha").await;
    assert!(wait_until(RELAY_TIMEOUT_MS, || first_events.has(&RelayEvent::Created)).await);

    let (mut second, second_events) = join(&relay, "beta").await;
    assert!(wait_until(RELAY_TIMEOUT_MS, || second_events.has(&RelayEvent::Joined)).await);
    assert!(wait_until(RELAY_TIMEOUT_MS, || first_events.has(&RelayEvent::Join)).await);
    assert_eq!(relay.occupants("lobby"), 2);

    let (mut third, third_events) = join(&relay, "gamma").await;
    assert!(wait_until(RELAY_TIMEOUT_MS, || third_events.has(&RelayEvent::Full)).await);
    assert!(!third_events.has(&RelayEvent::Created));
    assert!(
        third_events
            .events()
            .iter()
            .any(|e| matches!(e, RelayEvent::Log(_)))
    );

    third.disconnect().await;
    second.disconnect().await;
    first.disconnect().await;
}

#[tokio::test]
async fn test_messages_reach_the_other_peer() {
    init_tracing();

    let relay = MockRelay::start().await.expect("relay should start");
    let room = RoomId::from("lobby");

    let (mut first, first_events) = join(&relay, "alpha").await;
    assert!(wait_until(RELAY_TIMEOUT_MS, || first_events.has(&RelayEvent::Created)).await);
    let (mut second, second_events) = join(&relay, "beta").await;
    assert!(wait_until(RELAY_TIMEOUT_MS, || second_events.has(&RelayEvent::Joined)).await);

    first.send(RelayCommand::Message(NegotiationMessage::offer(
        &room,
        "v=0".to_owned(),
    )));

    let expected = RelayEvent::Message(json!({"type": "offer", "room": "lobby", "sdp": "v=0"}));
    assert!(wait_until(RELAY_TIMEOUT_MS, || second_events.has(&expected)).await);
    assert!(!first_events.has(&expected), "sender should not hear its own message");

    let sent = relay.received_named("message");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].peer_id, "alpha");

    second.disconnect().await;
    first.disconnect().await;
}

#[tokio::test]
async fn test_room_frees_up_when_peer_leaves() {
    init_tracing();

    let relay = MockRelay::start().await.expect("relay should start");

    let (mut first, first_events) = join(&relay, "alpha").await;
    assert!(wait_until(RELAY_TIMEOUT_MS, || first_events.has(&RelayEvent::Created)).await);
    first.disconnect().await;
    assert!(wait_until(RELAY_TIMEOUT_MS, || relay.occupants("lobby") == 0).await);

    let (mut second, second_events) = join(&relay, "beta").await;
    assert!(wait_until(RELAY_TIMEOUT_MS, || second_events.has(&RelayEvent::Created)).await);

    second.disconnect().await;
}
