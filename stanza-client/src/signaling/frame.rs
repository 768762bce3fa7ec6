use crate::signaling::FrameError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;

/// Payload of the Engine.IO `open` packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenHandshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    pub ping_interval: u64,
    pub ping_timeout: u64,
}

impl OpenHandshake {
    /// How long the server may stay silent before the connection is dead.
    pub fn ping_window(&self) -> Duration {
        Duration::from_millis(self.ping_interval + self.ping_timeout)
    }
}

/// Engine.IO v4 packet carried in one WebSocket text frame.
#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(OpenHandshake),
    Close,
    Ping,
    Pong,
    Message(SocketPacket),
    Upgrade,
    Noop,
}

impl EnginePacket {
    pub fn decode(text: &str) -> Result<Self, FrameError> {
        let (kind, body) = split_kind(text)?;
        match kind {
            '0' => Ok(EnginePacket::Open(serde_json::from_str(body)?)),
            '1' => Ok(EnginePacket::Close),
            // Probe payloads are only used during transport upgrades.
            '2' => Ok(EnginePacket::Ping),
            '3' => Ok(EnginePacket::Pong),
            '4' => Ok(EnginePacket::Message(SocketPacket::decode(body)?)),
            '5' => Ok(EnginePacket::Upgrade),
            '6' => Ok(EnginePacket::Noop),
            other => Err(FrameError::UnknownEngineType(other)),
        }
    }

    pub fn encode(&self) -> Result<String, FrameError> {
        let text = match self {
            EnginePacket::Open(handshake) => format!("0{}", serde_json::to_string(handshake)?),
            EnginePacket::Close => "1".to_owned(),
            EnginePacket::Ping => "2".to_owned(),
            EnginePacket::Pong => "3".to_owned(),
            EnginePacket::Message(packet) => format!("4{}", packet.encode()?),
            EnginePacket::Upgrade => "5".to_owned(),
            EnginePacket::Noop => "6".to_owned(),
        };
        Ok(text)
    }
}

/// Socket.IO v5 packet on the default namespace.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect(Option<Value>),
    Disconnect,
    Event { name: String, args: Vec<Value> },
    Ack,
    ConnectError(Value),
}

impl SocketPacket {
    pub fn event(name: impl Into<String>, args: Vec<Value>) -> Self {
        SocketPacket::Event {
            name: name.into(),
            args,
        }
    }

    /// `CONNECT` carrying the auth token, when there is one.
    pub fn connect_with_token(token: Option<&str>) -> Self {
        SocketPacket::Connect(token.map(|t| json!({ "token": t })))
    }

    pub fn decode(body: &str) -> Result<Self, FrameError> {
        let (kind, rest) = split_kind(body)?;
        let data = skip_ack_id(skip_namespace(rest));

        match kind {
            '0' if data.is_empty() => Ok(SocketPacket::Connect(None)),
            '0' => Ok(SocketPacket::Connect(Some(serde_json::from_str(data)?))),
            '1' => Ok(SocketPacket::Disconnect),
            '2' => {
                let mut items: Vec<Value> = serde_json::from_str(data)?;
                if items.is_empty() {
                    return Err(FrameError::MissingEventName);
                }
                let Value::String(name) = items.remove(0) else {
                    return Err(FrameError::MissingEventName);
                };
                Ok(SocketPacket::Event { name, args: items })
            }
            '3' => Ok(SocketPacket::Ack),
            '4' if data.is_empty() => Ok(SocketPacket::ConnectError(Value::Null)),
            '4' => Ok(SocketPacket::ConnectError(serde_json::from_str(data)?)),
            other => Err(FrameError::UnknownSocketType(other)),
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        let text = match self {
            SocketPacket::Connect(None) => "0".to_owned(),
            SocketPacket::Connect(Some(auth)) => format!("0{}", serde_json::to_string(auth)?),
            SocketPacket::Disconnect => "1".to_owned(),
            SocketPacket::Event { name, args } => {
                let mut items = Vec::with_capacity(args.len() + 1);
                items.push(Value::String(name.clone()));
                items.extend(args.iter().cloned());
                format!("2{}", serde_json::to_string(&items)?)
            }
            SocketPacket::Ack => "3[]".to_owned(),
            SocketPacket::ConnectError(data) => format!("4{}", serde_json::to_string(data)?),
        };
        Ok(text)
    }
}

fn split_kind(text: &str) -> Result<(char, &str), FrameError> {
    let kind = text.chars().next().ok_or(FrameError::Empty)?;
    Ok((kind, &text[kind.len_utf8()..]))
}

fn skip_namespace(rest: &str) -> &str {
    if !rest.starts_with('/') {
        return rest;
    }
    match rest.find(',') {
        Some(comma) => &rest[comma + 1..],
        None => "",
    }
}

fn skip_ack_id(rest: &str) -> &str {
    rest.trim_start_matches(|c: char| c.is_ascii_digit())
}
