use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Audio => f.write_str("audio"),
            MediaKind::Video => f.write_str("video"),
        }
    }
}

/// Transceiver direction for one media line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaDirection {
    SendRecv,
    SendOnly,
    RecvOnly,
    Inactive,
}

impl MediaDirection {
    /// Whether this direction needs a local track to feed the sender.
    pub fn sends(&self) -> bool {
        matches!(self, MediaDirection::SendRecv | MediaDirection::SendOnly)
    }
}

/// Media lines this peer declares before negotiation starts.
///
/// `None` leaves the kind out of the offer entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaCapabilities {
    pub audio: Option<MediaDirection>,
    pub video: Option<MediaDirection>,
}

impl MediaCapabilities {
    pub fn direction(&self, kind: MediaKind) -> Option<MediaDirection> {
        match kind {
            MediaKind::Audio => self.audio,
            MediaKind::Video => self.video,
        }
    }

    /// Declared lines in m-line order.
    pub fn lines(&self) -> Vec<(MediaKind, MediaDirection)> {
        [MediaKind::Audio, MediaKind::Video]
            .into_iter()
            .filter_map(|kind| self.direction(kind).map(|dir| (kind, dir)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.audio.is_none() && self.video.is_none()
    }
}

impl Default for MediaCapabilities {
    /// Two-way audio, receive-only video.
    fn default() -> Self {
        Self {
            audio: Some(MediaDirection::SendRecv),
            video: Some(MediaDirection::RecvOnly),
        }
    }
}

/// Inbound track announced by the media engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTrack {
    pub kind: MediaKind,
    pub track_id: String,
    pub stream_id: String,
}
