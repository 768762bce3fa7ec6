pub mod call_flow_tests;
pub mod negotiator_tests;
pub mod retry_tests;

use std::sync::Arc;
use tracing::Level;

use stanza_client::{AlwaysGranted, CallController, CallHandle};
use stanza_core::{CallMachine, ClientConfig, PeerId, RelayEvent};

use crate::utils::{MockChannel, MockNegotiator, MockNegotiatorFactory, RecordingStatus, settle};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// A call wired to in-process mocks.
pub struct MockCall {
    pub handle: CallHandle,
    pub channel: MockChannel,
    pub factory: MockNegotiatorFactory,
    pub status: RecordingStatus,
}

impl MockCall {
    pub fn negotiator(&self) -> Arc<MockNegotiator> {
        self.factory
            .latest()
            .expect("controller should have created a negotiator")
    }

    /// Emit relay events and let the controller work through them.
    pub async fn relay(&self, events: Vec<RelayEvent>) {
        for event in events {
            assert!(self.channel.emit(event), "channel is not connected");
        }
        settle().await;
    }
}

pub async fn start_mock_call(factory: MockNegotiatorFactory) -> MockCall {
    let config = ClientConfig::default();
    let channel = MockChannel::new();
    let status = RecordingStatus::new();

    let controller = CallController::new(
        CallMachine::from_config(&config, PeerId::from("pixel")),
        Box::new(channel.clone()),
        Arc::new(factory.clone()),
        Arc::new(status.clone()),
    );

    let handle = controller
        .start(&AlwaysGranted)
        .await
        .expect("Failed to start call");

    MockCall {
        handle,
        channel,
        factory,
        status,
    }
}
