use tracing::{debug, error, info, warn};

use crate::config::{ClientConfig, RetryPolicy};
use crate::machine::input::{CallInput, Effect, NegotiationOutcome, PeerConnectionStatus};
use crate::model::{
    MediaCapabilities, NegotiationMessage, PeerId, RelayCommand, RelayEvent, RetryBudget,
    RetryDecision, RoomId, Session, SignalingState,
};

/// Signaling state machine for one call.
///
/// Pure: it never touches the network or the media engine. Every input returns
/// the ordered list of effects the caller has to carry out.
#[derive(Debug, Clone)]
pub struct CallMachine {
    session: Session,
    budget: RetryBudget,
    media: MediaCapabilities,
    retry_pending: bool,
}

impl CallMachine {
    pub fn new(
        room: RoomId,
        peer_id: PeerId,
        retry: &RetryPolicy,
        media: MediaCapabilities,
    ) -> Self {
        Self {
            session: Session::new(room, peer_id, 0),
            budget: RetryBudget::new(retry),
            media,
            retry_pending: false,
        }
    }

    pub fn from_config(config: &ClientConfig, peer_id: PeerId) -> Self {
        Self::new(config.room_id(), peer_id, &config.retry, config.media)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn budget(&self) -> &RetryBudget {
        &self.budget
    }

    pub fn state(&self) -> SignalingState {
        self.session.state()
    }

    pub fn epoch(&self) -> u64 {
        self.session.epoch()
    }

    pub fn is_retry_pending(&self) -> bool {
        self.retry_pending
    }

    /// The transport is being opened for the current session.
    pub fn begin(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.transition(SignalingState::Connecting, &mut effects);
        effects
    }

    /// Feed one input tagged with the session epoch it was produced for.
    ///
    /// Inputs from an earlier session are dropped.
    pub fn handle(&mut self, epoch: u64, input: CallInput) -> Vec<Effect> {
        if epoch != self.session.epoch() {
            debug!(
                "Dropping input from stale session {} (current {}): {:?}",
                epoch,
                self.session.epoch(),
                input
            );
            return Vec::new();
        }

        match input {
            CallInput::Relay(event) => self.on_relay(event),
            CallInput::Negotiation(outcome) => self.on_negotiation(outcome),
            CallInput::RetryElapsed => self.on_retry_elapsed(),
        }
    }

    /// Replace the session wholesale and ask for a full rebuild.
    pub fn restart(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.retry_pending {
            self.retry_pending = false;
            effects.push(Effect::CancelRetry);
        }

        self.session = self.session.renewed();
        self.budget.reset();
        info!(
            "Restarting call in room {} as session {}",
            self.session.room(),
            self.session.epoch()
        );

        effects.push(Effect::Restart);
        self.transition(SignalingState::Connecting, &mut effects);
        effects
    }

    /// Explicit teardown: no retry may fire afterwards.
    pub fn shutdown(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.retry_pending {
            self.retry_pending = false;
            effects.push(Effect::CancelRetry);
        }
        self.transition(SignalingState::Disconnected, &mut effects);
        effects
    }

    fn on_relay(&mut self, event: RelayEvent) -> Vec<Effect> {
        let mut effects = Vec::new();
        debug!("Relay `{}` while {:?}", event.name(), self.state());

        match event {
            RelayEvent::Connect => {
                if self.retry_pending {
                    self.retry_pending = false;
                    effects.push(Effect::CancelRetry);
                }
                self.budget.reset();
                self.transition(SignalingState::Connected, &mut effects);
                effects.push(Effect::Relay(RelayCommand::CreateOrJoin(
                    self.session.room().clone(),
                )));
            }

            RelayEvent::Created => {
                let previous = self.session.role();
                if self.session.claim_initiator() {
                    info!(
                        "Created room {}, acting as initiator (was {:?})",
                        self.session.room(),
                        previous
                    );
                } else {
                    warn!("Ignoring repeated `created` for room {}", self.session.room());
                }
                self.transition(SignalingState::Created, &mut effects);
            }

            RelayEvent::Full => {
                warn!("Room {} is full", self.session.room());
                self.transition(SignalingState::Full, &mut effects);
            }

            RelayEvent::Join => {
                info!("A peer joined room {}", self.session.room());
                self.session.mark_channel_ready();
                self.transition(SignalingState::Joining, &mut effects);
                self.declare_media(&mut effects);
                self.maybe_start(&mut effects);
            }

            RelayEvent::Joined => {
                if self.session.settle_responder() {
                    info!("Joined room {}, acting as responder", self.session.room());
                }
                self.transition(SignalingState::Joined, &mut effects);
                self.session.mark_channel_ready();
            }

            RelayEvent::Log(args) => {
                for arg in args {
                    debug!("relay: {}", arg);
                }
            }

            RelayEvent::Message(payload) => self.on_message(payload, &mut effects),

            RelayEvent::Disconnect { reason } => {
                info!("Relay connection lost: {}", reason);
                self.transition(SignalingState::Disconnected, &mut effects);

                match self.budget.on_disconnect() {
                    RetryDecision::Retry { attempt, delay } => {
                        if self.retry_pending {
                            effects.push(Effect::CancelRetry);
                        }
                        self.retry_pending = true;
                        info!(
                            "Reconnect attempt {}/{} in {:?}",
                            attempt,
                            self.budget.max_retries(),
                            delay
                        );
                        effects.push(Effect::ScheduleRetry { attempt, delay });
                    }
                    RetryDecision::Restart => {
                        warn!("Retry budget exhausted, restarting the session");
                        effects.extend(self.restart());
                    }
                }
            }
        }

        effects
    }

    fn on_message(&mut self, payload: serde_json::Value, effects: &mut Vec<Effect>) {
        let message = match NegotiationMessage::from_value(&payload) {
            Ok(m) => m,
            Err(e) => {
                warn!("Dropping relay message: {}. Payload: {}", e, payload);
                return;
            }
        };

        match message {
            NegotiationMessage::Offer { sdp, .. } => {
                info!(
                    "Received an offer (initiator={}, started={})",
                    self.session.is_initiator(),
                    self.session.is_started()
                );
                self.transition(SignalingState::CreatingAnswer, effects);
                if !self.session.is_initiator() && !self.session.is_started() {
                    self.maybe_start(effects);
                }
                effects.push(Effect::AnswerOffer { sdp });
            }

            NegotiationMessage::Answer { sdp, .. } => {
                if !self.session.is_started() {
                    debug!("Ignoring answer: negotiation not started");
                    return;
                }
                self.transition(SignalingState::ReceivedAnswer, effects);
                effects.push(Effect::ApplyAnswer { sdp });
            }

            msg @ NegotiationMessage::Candidate { .. } => {
                if !self.session.is_started() {
                    debug!("Ignoring candidate: negotiation not started");
                    return;
                }
                let Some(candidate) = msg.ice_candidate() else {
                    return;
                };
                self.transition(SignalingState::ReceivedCandidate, effects);
                effects.push(Effect::AddCandidate(candidate));
            }
        }
    }

    fn on_negotiation(&mut self, outcome: NegotiationOutcome) -> Vec<Effect> {
        let mut effects = Vec::new();
        let room = self.session.room().clone();

        match outcome {
            NegotiationOutcome::OfferReady { sdp } => {
                info!("Sending offer to room {}", room);
                effects.push(Effect::Relay(RelayCommand::Message(
                    NegotiationMessage::offer(&room, sdp),
                )));
            }

            NegotiationOutcome::AnswerReady { sdp } => {
                info!("Sending answer to room {}", room);
                effects.push(Effect::Relay(RelayCommand::Message(
                    NegotiationMessage::answer(&room, sdp),
                )));
            }

            NegotiationOutcome::RemoteDescriptionApplied { kind } => {
                debug!("Remote {:?} applied", kind);
            }

            NegotiationOutcome::CandidateGathered(candidate) => {
                debug!("Sending local candidate {}", candidate.candidate);
                effects.push(Effect::Relay(RelayCommand::Message(
                    NegotiationMessage::candidate(&room, &candidate),
                )));
            }

            NegotiationOutcome::ConnectionStateChanged(status) => match status {
                PeerConnectionStatus::Connected => {
                    info!("Peer connection established");
                    self.transition(SignalingState::Done, &mut effects);
                }
                PeerConnectionStatus::Disconnected | PeerConnectionStatus::Failed => {
                    warn!("Peer connection {:?}, restarting the session", status);
                    effects.extend(self.restart());
                }
                other => debug!("Peer connection state: {:?}", other),
            },

            NegotiationOutcome::Failed { step, reason } => {
                error!("Negotiation step `{}` failed: {}", step, reason);
            }
        }

        effects
    }

    fn on_retry_elapsed(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if !self.retry_pending {
            debug!("Ignoring retry timer: nothing pending");
            return effects;
        }
        self.retry_pending = false;
        self.transition(SignalingState::Connecting, &mut effects);
        effects.push(Effect::Reconnect);
        effects
    }

    fn declare_media(&mut self, effects: &mut Vec<Effect>) {
        if self.session.mark_media_declared() {
            effects.push(Effect::DeclareMedia(self.media));
        }
    }

    fn maybe_start(&mut self, effects: &mut Vec<Effect>) {
        debug!(
            "maybe_start: started={} channel_ready={}",
            self.session.is_started(),
            self.session.is_channel_ready()
        );
        if !self.session.try_start() {
            return;
        }

        self.declare_media(effects);
        if self.session.is_initiator() {
            self.transition(SignalingState::Offering, effects);
            effects.push(Effect::CreateOffer);
        }
    }

    fn transition(&mut self, state: SignalingState, effects: &mut Vec<Effect>) {
        self.session.set_state(state);
        effects.push(Effect::StateChanged(state));
    }
}
