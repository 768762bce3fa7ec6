use crate::error::ConfigError;
use crate::model::{MediaCapabilities, PeerId, RoomId};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";
pub const DEFAULT_SOCKET_PATH: &str = "/socket.io/";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl Default for IceServerConfig {
    fn default() -> Self {
        Self {
            urls: vec![DEFAULT_STUN_ADDR.to_owned()],
            username: None,
            credential: None,
        }
    }
}

/// Where and how to reach the signaling relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub base_url: String,
    pub path: String,
    pub auth_token: Option<String>,
    pub peer_id: Option<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3030".to_owned(),
            path: DEFAULT_SOCKET_PATH.to_owned(),
            auth_token: None,
            peer_id: None,
        }
    }
}

impl RelayConfig {
    /// WebSocket endpoint for the relay, carrying the peer id as `peerID`.
    pub fn endpoint(&self, peer_id: &PeerId) -> Result<Url, ConfigError> {
        let mut url = Url::parse(&self.base_url).map_err(|source| ConfigError::InvalidUrl {
            url: self.base_url.clone(),
            source,
        })?;

        let scheme = match url.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            other => return Err(ConfigError::UnsupportedScheme(other.to_owned())),
        };
        // Switching between special schemes always succeeds.
        let _ = url.set_scheme(scheme);

        if !self.path.starts_with('/') {
            return Err(ConfigError::InvalidPath(self.path.clone()));
        }
        url.set_path(&self.path);
        url.query_pairs_mut()
            .clear()
            .append_pair("EIO", "4")
            .append_pair("transport", "websocket")
            .append_pair("peerID", peer_id.as_str());

        Ok(url)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay_ms: u64,
    pub enabled: bool,
}

impl RetryPolicy {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay_ms: 5000,
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub relay: RelayConfig,
    pub room: String,
    pub ice_servers: Vec<IceServerConfig>,
    pub retry: RetryPolicy,
    pub media: MediaCapabilities,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay: RelayConfig::default(),
            room: "lobby".to_owned(),
            ice_servers: vec![IceServerConfig::default()],
            retry: RetryPolicy::default(),
            media: MediaCapabilities::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn room_id(&self) -> RoomId {
        RoomId::new(self.room.clone())
    }

    /// Configured peer id, or a random one when none is set.
    pub fn peer_id(&self) -> PeerId {
        match &self.relay.peer_id {
            Some(id) if !id.is_empty() => PeerId::new(id.clone()),
            _ => PeerId::random(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.room.trim().is_empty() {
            return Err(ConfigError::EmptyRoom);
        }
        if self.retry.enabled && self.retry.max_retries == 0 {
            return Err(ConfigError::InvalidRetry);
        }
        self.relay.endpoint(&PeerId::from("probe"))?;
        Ok(())
    }
}
