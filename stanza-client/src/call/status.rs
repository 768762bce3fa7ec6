use async_trait::async_trait;
use stanza_core::{RemoteTrack, SignalingState};
use tracing::info;

/// Where the user-facing call status goes.
pub trait StatusSink: Send + Sync {
    fn on_state(&self, state: SignalingState);

    fn on_remote_track(&self, track: &RemoteTrack) {
        info!(
            "Remote {} track {} in stream {}",
            track.kind, track.track_id, track.stream_id
        );
    }
}

/// Writes the state label to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogStatusSink;

impl StatusSink for LogStatusSink {
    fn on_state(&self, state: SignalingState) {
        info!("Call state: {}", state.label());
    }
}

/// Asked once before a call starts capturing media.
#[async_trait]
pub trait PermissionGate: Send + Sync {
    async fn request(&self) -> bool;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysGranted;

#[async_trait]
impl PermissionGate for AlwaysGranted {
    async fn request(&self) -> bool {
        true
    }
}
