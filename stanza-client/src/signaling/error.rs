use stanza_core::ConfigError;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// A text frame that is not valid Engine.IO / Socket.IO.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("empty frame")]
    Empty,

    #[error("unknown engine packet type `{0}`")]
    UnknownEngineType(char),

    #[error("unknown socket packet type `{0}`")]
    UnknownSocketType(char),

    #[error("event packet without an event name")]
    MissingEventName,

    #[error("invalid packet data: {0}")]
    Json(#[from] serde_json::Error),
}
