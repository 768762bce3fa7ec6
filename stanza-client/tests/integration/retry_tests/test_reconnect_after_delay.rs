use std::time::Duration;

use stanza_core::{RelayCommand, RelayEvent, SignalingState};

use crate::integration::{init_tracing, start_mock_call};
use crate::utils::{MockNegotiatorFactory, settle};

#[tokio::test(start_paused = true)]
async fn test_reconnect_waits_for_retry_delay() {
    init_tracing();

    let call = start_mock_call(MockNegotiatorFactory::new()).await;
    call.relay(vec![RelayEvent::Connect]).await;
    assert_eq!(call.channel.connect_count(), 1);

    assert!(call.channel.drop_link());
    settle().await;
    assert_eq!(call.status.last(), Some(SignalingState::Disconnected));

    tokio::time::sleep(Duration::from_millis(4000)).await;
    assert_eq!(call.channel.connect_count(), 1, "retried before the delay");

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(call.channel.connect_count(), 2);
    assert_eq!(call.status.last(), Some(SignalingState::Connecting));

    // Same session: no new peer connection.
    assert_eq!(call.factory.created_count(), 1);
    assert!(!call.negotiator().was_disposed());

    call.relay(vec![RelayEvent::Connect]).await;
    assert_eq!(call.status.last(), Some(SignalingState::Connected));
    let joins = call
        .channel
        .sent()
        .into_iter()
        .filter(|c| matches!(c, RelayCommand::CreateOrJoin(_)))
        .count();
    assert_eq!(joins, 2, "room is joined again after reconnecting");

    call.handle.shutdown().await.expect("shutdown failed");
}

#[tokio::test(start_paused = true)]
async fn test_connect_resets_retry_budget() {
    init_tracing();

    let call = start_mock_call(MockNegotiatorFactory::new()).await;
    call.relay(vec![RelayEvent::Connect]).await;

    for round in 0..4 {
        assert!(call.channel.drop_link(), "round {round}");
        tokio::time::sleep(Duration::from_millis(5500)).await;
        call.relay(vec![RelayEvent::Connect]).await;
    }

    assert_eq!(call.channel.connect_count(), 5);
    assert_eq!(call.factory.created_count(), 1, "never restarted");
    assert_eq!(call.status.last(), Some(SignalingState::Connected));

    call.handle.shutdown().await.expect("shutdown failed");
}

#[tokio::test(start_paused = true)]
async fn test_reconnected_link_cancels_pending_retry() {
    init_tracing();

    let call = start_mock_call(MockNegotiatorFactory::new()).await;
    call.relay(vec![RelayEvent::Connect]).await;

    assert!(call.channel.drop_link());
    settle().await;
    // Transport recovered on its own before the timer fired.
    call.relay(vec![RelayEvent::Connect]).await;

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(call.channel.connect_count(), 1);
    assert_eq!(call.status.last(), Some(SignalingState::Connected));

    call.handle.shutdown().await.expect("shutdown failed");
}
