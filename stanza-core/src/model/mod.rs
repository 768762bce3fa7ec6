mod media;
mod message;
mod peer;
mod relay;
mod retry;
mod room;
mod session;
mod signaling_state;

pub use media::{MediaCapabilities, MediaDirection, MediaKind, RemoteTrack};
pub use message::{IceCandidate, NegotiationMessage, SdpKind, SessionDescription};
pub use peer::PeerId;
pub use relay::{RelayCommand, RelayEvent, events};
pub use retry::{RetryBudget, RetryDecision};
pub use room::RoomId;
pub use session::{Role, Session};
pub use signaling_state::SignalingState;
