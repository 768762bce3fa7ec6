use crate::model::peer::PeerId;
use crate::model::room::RoomId;
use crate::model::signaling_state::SignalingState;

/// Negotiation role, decided by the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    /// No `created`/`joined` seen yet in this session.
    #[default]
    Undecided,
    /// First peer in the room, creates the offer.
    Initiator,
    /// Second peer, answers the offer.
    Responder,
}

/// One call attempt. A restart replaces the whole value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    room: RoomId,
    peer_id: PeerId,
    epoch: u64,
    role: Role,
    started: bool,
    channel_ready: bool,
    media_declared: bool,
    state: SignalingState,
}

impl Session {
    pub fn new(room: RoomId, peer_id: PeerId, epoch: u64) -> Self {
        Self {
            room,
            peer_id,
            epoch,
            role: Role::Undecided,
            started: false,
            channel_ready: false,
            media_declared: false,
            state: SignalingState::Disconnected,
        }
    }

    /// Fresh session for the same room and peer, with the next epoch.
    pub fn renewed(&self) -> Self {
        Self::new(self.room.clone(), self.peer_id.clone(), self.epoch + 1)
    }

    pub fn room(&self) -> &RoomId {
        &self.room
    }

    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_initiator(&self) -> bool {
        self.role == Role::Initiator
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_channel_ready(&self) -> bool {
        self.channel_ready
    }

    pub fn is_media_declared(&self) -> bool {
        self.media_declared
    }

    pub fn state(&self) -> SignalingState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: SignalingState) {
        self.state = state;
    }

    /// `created` makes this peer the initiator, once per session.
    ///
    /// A responder that finds the room empty again after reconnecting is
    /// promoted, since the next peer to arrive will wait for an offer.
    pub(crate) fn claim_initiator(&mut self) -> bool {
        if self.role == Role::Initiator {
            return false;
        }
        self.role = Role::Initiator;
        true
    }

    /// `joined` only records a role nobody has decided yet.
    pub(crate) fn settle_responder(&mut self) -> bool {
        if self.role != Role::Undecided {
            return false;
        }
        self.role = Role::Responder;
        true
    }

    pub(crate) fn mark_channel_ready(&mut self) {
        self.channel_ready = true;
    }

    /// The `maybeStart` gate: flips `started` once, and only when a peer is present.
    pub(crate) fn try_start(&mut self) -> bool {
        if self.started || !self.channel_ready {
            return false;
        }
        self.started = true;
        true
    }

    pub(crate) fn mark_media_declared(&mut self) -> bool {
        if self.media_declared {
            return false;
        }
        self.media_declared = true;
        true
    }
}
