mod test_rtc_negotiator;

use bytes::Bytes;
use stanza_client::NegotiationObserver;
use stanza_core::{IceCandidate, PeerConnectionStatus, RemoteTrack};
use std::sync::{Arc, Mutex};

/// NegotiationObserver that keeps what the media engine reported.
#[derive(Clone, Default)]
pub struct RecordingNegotiationObserver {
    candidates: Arc<Mutex<Vec<IceCandidate>>>,
    states: Arc<Mutex<Vec<PeerConnectionStatus>>>,
}

impl RecordingNegotiationObserver {
    pub fn candidates(&self) -> Vec<IceCandidate> {
        self.candidates.lock().unwrap().clone()
    }

    pub fn states(&self) -> Vec<PeerConnectionStatus> {
        self.states.lock().unwrap().clone()
    }
}

impl NegotiationObserver for RecordingNegotiationObserver {
    fn on_ice_candidate(&self, candidate: IceCandidate) {
        self.candidates.lock().unwrap().push(candidate);
    }

    fn on_connection_state(&self, status: PeerConnectionStatus) {
        self.states.lock().unwrap().push(status);
    }

    fn on_remote_track(&self, track: RemoteTrack) {
        tracing::debug!("[RecordingNegotiationObserver] remote track {:?}", track);
    }

    fn on_data_channel_message(&self, label: String, data: Bytes) {
        tracing::debug!(
            "[RecordingNegotiationObserver] {} bytes on '{}'",
            data.len(),
            label
        );
    }
}
