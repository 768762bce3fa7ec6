use crate::model::{
    IceCandidate, MediaCapabilities, RelayCommand, RelayEvent, SdpKind, SignalingState,
};
use std::fmt;
use std::time::Duration;

/// Peer connection state as reported by the media engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerConnectionStatus {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

/// Negotiator operation that produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationStep {
    DeclareMedia,
    CreateOffer,
    CreateAnswer,
    SetLocalDescription,
    SetRemoteDescription,
    AddIceCandidate,
}

impl fmt::Display for NegotiationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NegotiationStep::DeclareMedia => "declare media",
            NegotiationStep::CreateOffer => "create offer",
            NegotiationStep::CreateAnswer => "create answer",
            NegotiationStep::SetLocalDescription => "set local description",
            NegotiationStep::SetRemoteDescription => "set remote description",
            NegotiationStep::AddIceCandidate => "add ice candidate",
        };
        f.write_str(name)
    }
}

/// Completion or notification coming back from the negotiator side.
#[derive(Debug, Clone, PartialEq)]
pub enum NegotiationOutcome {
    /// Offer created and applied locally.
    OfferReady { sdp: String },
    /// Answer created against the applied remote offer and applied locally.
    AnswerReady { sdp: String },
    RemoteDescriptionApplied { kind: SdpKind },
    CandidateGathered(IceCandidate),
    ConnectionStateChanged(PeerConnectionStatus),
    Failed {
        step: NegotiationStep,
        reason: String,
    },
}

/// Everything the state machine reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum CallInput {
    Relay(RelayEvent),
    Negotiation(NegotiationOutcome),
    /// The scheduled reconnect delay elapsed.
    RetryElapsed,
}

/// Side effect requested by the state machine, executed in order by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StateChanged(SignalingState),
    Relay(RelayCommand),
    DeclareMedia(MediaCapabilities),
    CreateOffer,
    /// Apply the remote offer, then create, apply and report an answer.
    AnswerOffer { sdp: String },
    ApplyAnswer { sdp: String },
    AddCandidate(IceCandidate),
    ScheduleRetry { attempt: u32, delay: Duration },
    CancelRetry,
    /// Reconnect the transport for the current session.
    Reconnect,
    /// Dispose the current engine and channel and bring up the new session.
    Restart,
}
