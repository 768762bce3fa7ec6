use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse progress of the call, as shown to the user.
///
/// Only `Disconnected` carries behaviour (it hands control to the retry
/// supervisor); every other value is informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SignalingState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Created,
    Joining,
    Joined,
    Full,
    Offering,
    ReceivedOffer,
    ReceivedAnswer,
    ReceivedCandidate,
    CreatingAnswer,
    Done,
}

impl SignalingState {
    /// Human readable status line.
    pub fn label(&self) -> &'static str {
        match self {
            SignalingState::Disconnected => "Disconnected",
            SignalingState::Connecting => "Connecting...",
            SignalingState::Connected => "Connected",
            SignalingState::Created => "Created",
            SignalingState::Joining => "Joining...",
            SignalingState::Joined => "Joined",
            SignalingState::Full => "Full",
            SignalingState::Offering => "Offering...",
            SignalingState::ReceivedOffer => "ReceivedOffer",
            SignalingState::ReceivedAnswer => "ReceivedAnswer",
            SignalingState::ReceivedCandidate => "ReceivedCandidate",
            SignalingState::CreatingAnswer => "CreatingAnswer...",
            SignalingState::Done => "OK!",
        }
    }
}

impl fmt::Display for SignalingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
