use thiserror::Error;

#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error("webrtc error: {0}")]
    WebRtc(#[from] webrtc::Error),

    #[error("invalid ice server url `{0}`")]
    InvalidIceServer(String),

    #[error("peer connection already disposed")]
    Disposed,
}
