use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid relay url `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported relay url scheme `{0}` (expected http, https, ws or wss)")]
    UnsupportedScheme(String),

    #[error("relay path must start with '/': `{0}`")]
    InvalidPath(String),

    #[error("room id must not be empty")]
    EmptyRoom,

    #[error("max_retries must be at least 1")]
    InvalidRetry,

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Reasons a relay `message` payload is dropped.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("payload is not a JSON object")]
    NotAnObject,

    #[error("payload has no `type` field")]
    MissingType,

    #[error("unknown message type `{0}`")]
    UnknownType(String),

    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
}
