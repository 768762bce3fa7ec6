use crate::call::{
    CallCommand, CallError, CallHandle, Envelope, MailboxEvent, NegotiationJob, NegotiationWorker,
    PermissionGate, RetryTimer, SessionMailbox, StatusSink,
};
use crate::negotiator::{NegotiatorFactory, RtcNegotiatorFactory, SessionNegotiator};
use crate::signaling::{SignalingChannel, SocketIoChannel};
use stanza_core::{CallMachine, ClientConfig, Effect, RelayCommand, SignalingState};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

/// Actor that owns one call.
///
/// Relay events, media engine callbacks, negotiation results and the retry
/// timer all arrive through one mailbox and are fed to the `CallMachine` in
/// arrival order. The effects it returns are carried out here.
pub struct CallController {
    machine: CallMachine,
    channel: Box<dyn SignalingChannel>,
    factory: Arc<dyn NegotiatorFactory>,
    status: Arc<dyn StatusSink>,
    negotiator: Option<Arc<dyn SessionNegotiator>>,
    worker: Option<NegotiationWorker>,
    retry: RetryTimer,
    mailbox_tx: mpsc::UnboundedSender<Envelope>,
    mailbox_rx: mpsc::UnboundedReceiver<Envelope>,
    state_tx: watch::Sender<SignalingState>,
    /// Set when a session could not be rebuilt; nothing is left to drive the call.
    halted: bool,
}

impl CallController {
    pub fn new(
        machine: CallMachine,
        channel: Box<dyn SignalingChannel>,
        factory: Arc<dyn NegotiatorFactory>,
        status: Arc<dyn StatusSink>,
    ) -> Self {
        let (mailbox_tx, mailbox_rx) = mpsc::unbounded_channel();
        let (state_tx, _) = watch::channel(machine.state());

        Self {
            machine,
            channel,
            factory,
            status,
            negotiator: None,
            worker: None,
            retry: RetryTimer::new(),
            mailbox_tx,
            mailbox_rx,
            state_tx,
            halted: false,
        }
    }

    /// Controller talking Socket.IO to the configured relay, with webrtc-rs media.
    pub fn from_config(
        config: &ClientConfig,
        status: Arc<dyn StatusSink>,
    ) -> Result<Self, CallError> {
        config.validate()?;

        let peer_id = config.peer_id();
        let channel = SocketIoChannel::new(config.relay.clone(), peer_id.clone());
        let factory = RtcNegotiatorFactory::from_config(config);

        Ok(Self::new(
            CallMachine::from_config(config, peer_id),
            Box::new(channel),
            Arc::new(factory),
            status,
        ))
    }

    /// Wait for permission, bring up the first session and run on a new task.
    pub async fn start(mut self, gate: &dyn PermissionGate) -> Result<CallHandle, CallError> {
        if !gate.request().await {
            warn!("Media permission denied, not starting the call");
            return Err(CallError::PermissionDenied);
        }

        let effects = self.machine.begin();
        self.apply(effects).await;

        if let Err(e) = self.bring_up().await {
            error!("Failed to start call: {}", e);
            self.teardown().await;
            return Err(e);
        }

        let (command_tx, command_rx) = mpsc::channel(8);
        let state_rx = self.state_tx.subscribe();
        let task = tokio::spawn(self.run(command_rx));

        Ok(CallHandle::new(command_tx, state_rx, task))
    }

    async fn run(mut self, mut command_rx: mpsc::Receiver<CallCommand>) {
        info!(
            "Call controller started for room {}",
            self.machine.session().room()
        );

        loop {
            tokio::select! {
                biased;

                cmd = command_rx.recv() => match cmd {
                    Some(CallCommand::Shutdown) => break,
                    None => {
                        info!("Call handle dropped. Shutting down call.");
                        break;
                    }
                },

                envelope = self.mailbox_rx.recv() => match envelope {
                    Some(envelope) => {
                        self.dispatch(envelope).await;
                        if self.halted {
                            error!("Session {} is dead, stopping call", self.machine.epoch());
                            break;
                        }
                    }
                    None => {
                        warn!("Mailbox closed unexpectedly");
                        break;
                    }
                }
            }
        }

        let effects = self.machine.shutdown();
        self.apply(effects).await;
        self.teardown().await;

        info!("Call controller finished");
    }

    async fn dispatch(&mut self, envelope: Envelope) {
        let Envelope { epoch, event } = envelope;
        let current = epoch == self.machine.epoch();

        match event {
            MailboxEvent::Input(input) => {
                let effects = self.machine.handle(epoch, input);
                self.apply(effects).await;
            }
            MailboxEvent::RemoteTrack(track) if current => self.status.on_remote_track(&track),
            MailboxEvent::DataMessage { label, data } if current => {
                info!(
                    "Data channel '{}': {}",
                    label,
                    String::from_utf8_lossy(&data)
                );
            }
            _ => debug!("Dropping media event from stale session {}", epoch),
        }
    }

    async fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StateChanged(state) => {
                    self.state_tx.send_replace(state);
                    self.status.on_state(state);
                }
                Effect::Relay(RelayCommand::CreateOrJoin(room)) => self.channel.join_room(&room),
                Effect::Relay(command) => self.channel.send(command),
                Effect::DeclareMedia(media) => self.submit(NegotiationJob::DeclareMedia(media)),
                Effect::CreateOffer => self.submit(NegotiationJob::CreateOffer),
                Effect::AnswerOffer { sdp } => self.submit(NegotiationJob::AnswerOffer { sdp }),
                Effect::ApplyAnswer { sdp } => self.submit(NegotiationJob::ApplyAnswer { sdp }),
                Effect::AddCandidate(candidate) => {
                    self.submit(NegotiationJob::AddCandidate(candidate))
                }
                Effect::ScheduleRetry { attempt, delay } => {
                    debug!("Scheduling reconnect attempt {} in {:?}", attempt, delay);
                    let mailbox = self.mailbox();
                    self.retry.schedule(delay, mailbox);
                }
                Effect::CancelRetry => {
                    self.retry.cancel();
                }
                Effect::Reconnect => self.reconnect().await,
                Effect::Restart => self.rebuild().await,
            }
        }
    }

    fn submit(&self, job: NegotiationJob) {
        match &self.worker {
            Some(worker) => worker.submit(job),
            None => warn!("No negotiator for session {}, dropping {:?}", self.machine.epoch(), job),
        }
    }

    fn mailbox(&self) -> SessionMailbox {
        SessionMailbox::new(self.machine.epoch(), self.mailbox_tx.clone())
    }

    /// Fresh negotiator and relay connection for the current session.
    async fn bring_up(&mut self) -> Result<(), CallError> {
        let mailbox = self.mailbox();

        let negotiator = self.factory.create(Arc::new(mailbox.clone())).await?;
        self.worker = Some(NegotiationWorker::spawn(
            negotiator.clone(),
            mailbox.clone(),
        ));
        self.negotiator = Some(negotiator);

        self.channel.connect(Arc::new(mailbox)).await?;
        info!("Session {} is up", self.machine.epoch());
        Ok(())
    }

    /// Stop everything of the current session. Disposal completes before return.
    async fn teardown(&mut self) {
        self.retry.cancel();
        self.channel.disconnect().await;

        if let Some(worker) = self.worker.take() {
            worker.shutdown().await;
        }
        if let Some(negotiator) = self.negotiator.take() {
            if let Err(e) = negotiator.dispose().await {
                warn!("Failed to dispose peer connection: {}", e);
            }
        }
    }

    async fn rebuild(&mut self) {
        self.teardown().await;
        if let Err(e) = self.bring_up().await {
            error!("Failed to rebuild session {}: {}", self.machine.epoch(), e);
            self.halted = true;
        }
    }

    async fn reconnect(&mut self) {
        self.channel.disconnect().await;
        let mailbox = self.mailbox();
        if let Err(e) = self.channel.connect(Arc::new(mailbox)).await {
            error!("Reconnect failed: {}", e);
        }
    }
}
