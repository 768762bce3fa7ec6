use crate::model::message::NegotiationMessage;
use crate::model::room::RoomId;
use serde_json::Value;

/// Event names of the relay protocol.
pub mod events {
    pub const CONNECT: &str = "connect";
    pub const DISCONNECT: &str = "disconnect";
    pub const CREATE_OR_JOIN: &str = "create or join";
    pub const CREATED: &str = "created";
    pub const FULL: &str = "full";
    pub const JOIN: &str = "join";
    pub const JOINED: &str = "joined";
    pub const LOG: &str = "log";
    pub const MESSAGE: &str = "message";
}

/// Inbound event delivered by the signaling channel.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayEvent {
    /// Transport (re)connected and the relay accepted the socket.
    Connect,
    /// This peer is the first in the room.
    Created,
    /// The room already holds two peers.
    Full,
    /// Another peer joined the room this peer created.
    Join,
    /// This peer joined a room somebody else created.
    Joined,
    Log(Vec<Value>),
    /// Raw `message` payload, decoded by the state machine.
    Message(Value),
    Disconnect { reason: String },
}

impl RelayEvent {
    /// Map a named relay event and its arguments. Unknown names yield `None`.
    pub fn from_named(name: &str, mut args: Vec<Value>) -> Option<Self> {
        let event = match name {
            events::CONNECT => RelayEvent::Connect,
            events::CREATED => RelayEvent::Created,
            events::FULL => RelayEvent::Full,
            events::JOIN => RelayEvent::Join,
            events::JOINED => RelayEvent::Joined,
            events::LOG => RelayEvent::Log(args),
            events::MESSAGE => {
                let payload = if args.is_empty() {
                    Value::Null
                } else {
                    args.swap_remove(0)
                };
                RelayEvent::Message(payload)
            }
            events::DISCONNECT => RelayEvent::Disconnect {
                reason: args
                    .first()
                    .and_then(Value::as_str)
                    .unwrap_or("server disconnect")
                    .to_owned(),
            },
            _ => return None,
        };
        Some(event)
    }

    pub fn name(&self) -> &'static str {
        match self {
            RelayEvent::Connect => events::CONNECT,
            RelayEvent::Created => events::CREATED,
            RelayEvent::Full => events::FULL,
            RelayEvent::Join => events::JOIN,
            RelayEvent::Joined => events::JOINED,
            RelayEvent::Log(_) => events::LOG,
            RelayEvent::Message(_) => events::MESSAGE,
            RelayEvent::Disconnect { .. } => events::DISCONNECT,
        }
    }
}

/// Outbound event emitted to the relay.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayCommand {
    CreateOrJoin(RoomId),
    Message(NegotiationMessage),
}

impl RelayCommand {
    pub fn event_name(&self) -> &'static str {
        match self {
            RelayCommand::CreateOrJoin(_) => events::CREATE_OR_JOIN,
            RelayCommand::Message(_) => events::MESSAGE,
        }
    }

    pub fn args(&self) -> Result<Vec<Value>, serde_json::Error> {
        match self {
            RelayCommand::CreateOrJoin(room) => Ok(vec![Value::String(room.to_string())]),
            RelayCommand::Message(msg) => Ok(vec![msg.to_value()?]),
        }
    }
}
