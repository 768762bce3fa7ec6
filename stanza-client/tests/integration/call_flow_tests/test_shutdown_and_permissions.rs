use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use stanza_client::{CallController, CallError, PermissionGate};
use stanza_core::{CallMachine, ClientConfig, PeerId, RelayEvent, SignalingState};

use crate::integration::{init_tracing, start_mock_call};
use crate::utils::{MockChannel, MockNegotiatorFactory, RecordingStatus, settle};

struct Denied;

#[async_trait]
impl PermissionGate for Denied {
    async fn request(&self) -> bool {
        false
    }
}

#[tokio::test]
async fn test_denied_permission_never_connects() {
    init_tracing();

    let channel = MockChannel::new();
    let factory = MockNegotiatorFactory::new();
    let config = ClientConfig::default();

    let controller = CallController::new(
        CallMachine::from_config(&config, PeerId::from("pixel")),
        Box::new(channel.clone()),
        Arc::new(factory.clone()),
        Arc::new(RecordingStatus::new()),
    );

    let result = controller.start(&Denied).await;
    assert!(matches!(result, Err(CallError::PermissionDenied)));
    assert_eq!(channel.connect_count(), 0);
    assert_eq!(factory.created_count(), 0);
}

#[tokio::test]
async fn test_shutdown_disposes_everything() {
    init_tracing();

    let call = start_mock_call(MockNegotiatorFactory::new()).await;
    call.relay(vec![RelayEvent::Connect, RelayEvent::Created]).await;
    assert!(call.handle.is_running());

    let negotiator = call.negotiator();
    let channel = call.channel.clone();
    let status = call.status.clone();

    call.handle.shutdown().await.expect("shutdown failed");

    assert!(negotiator.was_disposed());
    assert!(!channel.is_connected());
    assert_eq!(status.last(), Some(SignalingState::Disconnected));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_pending_retry() {
    init_tracing();

    let call = start_mock_call(MockNegotiatorFactory::new()).await;
    call.relay(vec![RelayEvent::Connect]).await;
    assert!(call.channel.drop_link());
    settle().await;

    let channel = call.channel.clone();
    call.handle.shutdown().await.expect("shutdown failed");

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(channel.connect_count(), 1);
}

#[tokio::test]
async fn test_dropping_handle_stops_call() {
    init_tracing();

    let call = start_mock_call(MockNegotiatorFactory::new()).await;
    let negotiator = call.negotiator();
    let mut states = call.handle.subscribe();
    drop(call.handle);

    let stopped = tokio::time::timeout(
        Duration::from_secs(2),
        states.wait_for(|s| *s == SignalingState::Disconnected),
    )
    .await;
    assert!(stopped.is_ok(), "controller should shut down");
    settle().await;
    assert!(negotiator.was_disposed());
}
