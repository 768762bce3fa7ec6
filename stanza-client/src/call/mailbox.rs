use crate::negotiator::NegotiationObserver;
use crate::signaling::ChannelObserver;
use bytes::Bytes;
use stanza_core::{
    CallInput, IceCandidate, NegotiationOutcome, PeerConnectionStatus, RelayEvent, RemoteTrack,
};
use tokio::sync::mpsc;
use tracing::debug;

/// What arrives in the controller's mailbox.
#[derive(Debug)]
pub enum MailboxEvent {
    Input(CallInput),
    RemoteTrack(RemoteTrack),
    DataMessage { label: String, data: Bytes },
}

/// A mailbox event stamped with the session that produced it.
#[derive(Debug)]
pub struct Envelope {
    pub epoch: u64,
    pub event: MailboxEvent,
}

/// Per-session entry point into the controller.
///
/// Every callback source (relay link, media engine, negotiation worker, retry
/// timer) gets a clone, so whatever it posts carries the session epoch.
#[derive(Clone)]
pub struct SessionMailbox {
    epoch: u64,
    tx: mpsc::UnboundedSender<Envelope>,
}

impl SessionMailbox {
    pub fn new(epoch: u64, tx: mpsc::UnboundedSender<Envelope>) -> Self {
        Self { epoch, tx }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn post(&self, input: CallInput) {
        self.deliver(MailboxEvent::Input(input));
    }

    pub fn post_outcome(&self, outcome: NegotiationOutcome) {
        self.post(CallInput::Negotiation(outcome));
    }

    fn deliver(&self, event: MailboxEvent) {
        let envelope = Envelope {
            epoch: self.epoch,
            event,
        };
        if self.tx.send(envelope).is_err() {
            debug!("Controller gone, dropping event for session {}", self.epoch);
        }
    }
}

impl ChannelObserver for SessionMailbox {
    fn on_relay_event(&self, event: RelayEvent) {
        self.post(CallInput::Relay(event));
    }
}

impl NegotiationObserver for SessionMailbox {
    fn on_ice_candidate(&self, candidate: IceCandidate) {
        self.post_outcome(NegotiationOutcome::CandidateGathered(candidate));
    }

    fn on_connection_state(&self, status: PeerConnectionStatus) {
        self.post_outcome(NegotiationOutcome::ConnectionStateChanged(status));
    }

    fn on_remote_track(&self, track: RemoteTrack) {
        self.deliver(MailboxEvent::RemoteTrack(track));
    }

    fn on_data_channel_message(&self, label: String, data: Bytes) {
        self.deliver(MailboxEvent::DataMessage { label, data });
    }
}
