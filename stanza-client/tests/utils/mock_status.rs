use stanza_client::StatusSink;
use stanza_core::{RemoteTrack, SignalingState};
use std::sync::{Arc, Mutex};

/// StatusSink that keeps everything it is told.
#[derive(Clone, Default)]
pub struct RecordingStatus {
    states: Arc<Mutex<Vec<SignalingState>>>,
    tracks: Arc<Mutex<Vec<RemoteTrack>>>,
}

impl RecordingStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn states(&self) -> Vec<SignalingState> {
        self.states.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<SignalingState> {
        self.states.lock().unwrap().last().copied()
    }

    pub fn has_seen(&self, state: SignalingState) -> bool {
        self.states.lock().unwrap().contains(&state)
    }

    pub fn count(&self, state: SignalingState) -> usize {
        self.states
            .lock()
            .unwrap()
            .iter()
            .filter(|s| **s == state)
            .count()
    }

    pub fn tracks(&self) -> Vec<RemoteTrack> {
        self.tracks.lock().unwrap().clone()
    }
}

impl StatusSink for RecordingStatus {
    fn on_state(&self, state: SignalingState) {
        tracing::debug!("[RecordingStatus] {}", state.label());
        self.states.lock().unwrap().push(state);
    }

    fn on_remote_track(&self, track: &RemoteTrack) {
        self.tracks.lock().unwrap().push(track.clone());
    }
}
