use crate::negotiator::NegotiationError;
use crate::signaling::ChannelError;
use stanza_core::{ConfigError, SignalingState};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CallError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Negotiation(#[from] NegotiationError),

    #[error("permission to use camera and microphone was denied")]
    PermissionDenied,

    #[error("call controller has stopped")]
    Stopped,

    #[error("state {state} not reached within {timeout:?}")]
    Timeout {
        state: SignalingState,
        timeout: Duration,
    },
}
