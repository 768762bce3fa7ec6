use crate::error::MessageError;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Answer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDescription {
    pub kind: SdpKind,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Answer,
            sdp: sdp.into(),
        }
    }
}

/// ICE candidate as exchanged with the remote peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceCandidate {
    pub candidate: String,
    pub sdp_mid: Option<String>,
    pub sdp_mline_index: Option<u16>,
}

/// Payload of the relay `message` event.
///
/// Candidates use the field names of the classic relay protocol: `id` is the
/// media stream id and `label` the m-line index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NegotiationMessage {
    Offer {
        #[serde(default)]
        room: String,
        sdp: String,
    },
    Answer {
        #[serde(default)]
        room: String,
        sdp: String,
    },
    Candidate {
        #[serde(default)]
        room: String,
        id: String,
        label: u16,
        candidate: String,
    },
}

impl NegotiationMessage {
    pub fn offer(room: &RoomId, sdp: impl Into<String>) -> Self {
        NegotiationMessage::Offer {
            room: room.to_string(),
            sdp: sdp.into(),
        }
    }

    pub fn answer(room: &RoomId, sdp: impl Into<String>) -> Self {
        NegotiationMessage::Answer {
            room: room.to_string(),
            sdp: sdp.into(),
        }
    }

    pub fn candidate(room: &RoomId, candidate: &IceCandidate) -> Self {
        NegotiationMessage::Candidate {
            room: room.to_string(),
            id: candidate.sdp_mid.clone().unwrap_or_default(),
            label: candidate.sdp_mline_index.unwrap_or(0),
            candidate: candidate.candidate.clone(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            NegotiationMessage::Offer { .. } => "offer",
            NegotiationMessage::Answer { .. } => "answer",
            NegotiationMessage::Candidate { .. } => "candidate",
        }
    }

    pub fn room(&self) -> &str {
        match self {
            NegotiationMessage::Offer { room, .. }
            | NegotiationMessage::Answer { room, .. }
            | NegotiationMessage::Candidate { room, .. } => room,
        }
    }

    /// Decode the first argument of a relay `message` event.
    ///
    /// Some relays forward the payload as a JSON string instead of an object,
    /// both forms are accepted.
    pub fn from_value(value: &Value) -> Result<Self, MessageError> {
        if let Value::String(text) = value {
            let inner: Value = serde_json::from_str(text)?;
            return Self::from_value(&inner);
        }

        let Value::Object(fields) = value else {
            return Err(MessageError::NotAnObject);
        };

        match fields.get("type").and_then(Value::as_str) {
            None => Err(MessageError::MissingType),
            Some("offer" | "answer" | "candidate") => Ok(serde_json::from_value(value.clone())?),
            Some(other) => Err(MessageError::UnknownType(other.to_owned())),
        }
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Candidate payload in the shape the media engine expects.
    pub fn ice_candidate(&self) -> Option<IceCandidate> {
        match self {
            NegotiationMessage::Candidate {
                id,
                label,
                candidate,
                ..
            } => Some(IceCandidate {
                candidate: candidate.clone(),
                sdp_mid: Some(id.clone()),
                sdp_mline_index: Some(*label),
            }),
            _ => None,
        }
    }
}
