use serde_json::json;

use stanza_core::{RelayEvent, SignalingState};

use crate::integration::{init_tracing, start_mock_call};
use crate::utils::MockNegotiatorFactory;

#[tokio::test]
async fn test_answer_and_candidate_before_start_are_ignored() {
    init_tracing();

    let call = start_mock_call(MockNegotiatorFactory::new()).await;
    call.relay(vec![RelayEvent::Connect, RelayEvent::Created]).await;
    let states_before = call.status.states();

    call.relay(vec![
        RelayEvent::Message(json!({"type": "answer", "sdp": "stale"})),
        RelayEvent::Message(json!({"type": "candidate", "id": "0", "label": 0, "candidate": "c"})),
    ])
    .await;

    assert!(call.negotiator().calls().is_empty());
    assert_eq!(call.status.states(), states_before);
    assert_eq!(call.status.last(), Some(SignalingState::Created));

    call.handle.shutdown().await.expect("shutdown failed");
}

#[tokio::test]
async fn test_malformed_message_is_dropped() {
    init_tracing();

    let call = start_mock_call(MockNegotiatorFactory::new()).await;
    call.relay(vec![RelayEvent::Connect, RelayEvent::Joined]).await;
    let states_before = call.status.states();

    call.relay(vec![
        RelayEvent::Message(json!({"sdp": "missing type"})),
        RelayEvent::Message(json!({"type": "bye"})),
        RelayEvent::Message(json!("{not json")),
        RelayEvent::Message(json!(42)),
        RelayEvent::Log(vec![json!("Message from server:"), json!("hello")]),
    ])
    .await;

    assert!(call.negotiator().calls().is_empty());
    assert_eq!(call.status.states(), states_before);
    assert!(call.channel.sent_messages().is_empty());

    call.handle.shutdown().await.expect("shutdown failed");
}

#[tokio::test]
async fn test_full_room_stops_at_full() {
    init_tracing();

    let call = start_mock_call(MockNegotiatorFactory::new()).await;
    call.relay(vec![RelayEvent::Connect, RelayEvent::Full]).await;

    assert_eq!(call.status.last(), Some(SignalingState::Full));
    assert!(call.negotiator().calls().is_empty());

    call.handle.shutdown().await.expect("shutdown failed");
}
