use crate::signaling::ChannelError;
use async_trait::async_trait;
use stanza_core::{RelayCommand, RelayEvent, RoomId};
use std::sync::Arc;

/// Receives everything the relay sends while a channel is connected.
///
/// Called from the channel's own task. Implementations must not block.
pub trait ChannelObserver: Send + Sync {
    fn on_relay_event(&self, event: RelayEvent);
}

/// Event-based connection to the signaling relay.
#[async_trait]
pub trait SignalingChannel: Send + Sync {
    /// Open the connection and deliver inbound events to `observer`.
    ///
    /// Only configuration problems are returned. A relay that cannot be
    /// reached is reported as a `disconnect` event.
    async fn connect(&mut self, observer: Arc<dyn ChannelObserver>) -> Result<(), ChannelError>;

    /// Fire-and-forget emit.
    fn send(&self, command: RelayCommand);

    /// Close the connection. No event is delivered after this returns.
    async fn disconnect(&mut self);

    /// Ask the relay for a seat in `room` (`create or join`).
    fn join_room(&self, room: &RoomId) {
        self.send(RelayCommand::CreateOrJoin(room.clone()));
    }
}
