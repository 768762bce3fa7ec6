use crate::signaling::{
    ChannelError, ChannelObserver, EnginePacket, FrameError, SignalingChannel, SocketPacket,
};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use stanza_core::{PeerId, RelayCommand, RelayConfig, RelayEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};
use url::Url;

/// Time allowed for the WebSocket upgrade, and then for the engine handshake.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(20);

/// Time given to a closing link to say goodbye before it is aborted.
const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Relay channel speaking Socket.IO over a WebSocket.
///
/// Each `connect` spawns one link task that owns the socket. Commands sent
/// before the relay acknowledged the socket connection are buffered.
pub struct SocketIoChannel {
    relay: RelayConfig,
    peer_id: PeerId,
    outbound: Option<mpsc::UnboundedSender<RelayCommand>>,
    task: Option<JoinHandle<()>>,
}

impl SocketIoChannel {
    pub fn new(relay: RelayConfig, peer_id: PeerId) -> Self {
        Self {
            relay,
            peer_id,
            outbound: None,
            task: None,
        }
    }

    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    /// True while a link task is alive.
    pub fn is_open(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

#[async_trait]
impl SignalingChannel for SocketIoChannel {
    async fn connect(&mut self, observer: Arc<dyn ChannelObserver>) -> Result<(), ChannelError> {
        let url = match self.relay.endpoint(&self.peer_id) {
            Ok(url) => url,
            Err(e) => {
                error!("Refusing to connect to relay: {}", e);
                return Err(e.into());
            }
        };

        self.disconnect().await;

        let (tx, rx) = mpsc::unbounded_channel();
        let link = RelayLink {
            url,
            token: self.relay.auth_token.clone(),
            observer,
            outbound: rx,
        };
        self.outbound = Some(tx);
        self.task = Some(tokio::spawn(link.run()));
        Ok(())
    }

    fn send(&self, command: RelayCommand) {
        let Some(tx) = &self.outbound else {
            warn!("Relay not connected, dropping `{}`", command.event_name());
            return;
        };
        if let Err(e) = tx.send(command) {
            warn!("Relay link is gone, dropping `{}`", e.0.event_name());
        }
    }

    async fn disconnect(&mut self) {
        self.outbound = None;

        let Some(mut task) = self.task.take() else {
            return;
        };
        if tokio::time::timeout(CLOSE_GRACE, &mut task).await.is_err() {
            task.abort();
            let _ = task.await;
        }
        debug!("Relay link for {} closed", self.peer_id);
    }
}

enum LinkEnd {
    /// Closed on request; nobody needs to hear about it.
    Closed,
    Lost(String),
}

struct RelayLink {
    url: Url,
    token: Option<String>,
    observer: Arc<dyn ChannelObserver>,
    outbound: mpsc::UnboundedReceiver<RelayCommand>,
}

impl RelayLink {
    async fn run(mut self) {
        let reason = match self.pump().await {
            Ok(LinkEnd::Closed) => return,
            Ok(LinkEnd::Lost(reason)) => reason,
            Err(e) => e.to_string(),
        };

        info!("Relay link lost: {}", reason);
        self.observer
            .on_relay_event(RelayEvent::Disconnect { reason });
    }

    async fn pump(&mut self) -> Result<LinkEnd, ChannelError> {
        debug!("Connecting to relay at {}", self.url);
        // A relay that accepts TCP but never upgrades must not hang the link.
        let upgrade = tokio::time::timeout(HANDSHAKE_TIMEOUT, connect_async(self.url.as_str()));
        let (ws, _) = match upgrade.await {
            Ok(connected) => connected?,
            Err(_) => return Ok(LinkEnd::Lost("handshake timeout".to_owned())),
        };
        let (mut write, mut read) = ws.split();

        let mut acknowledged = false;
        let mut pending = Vec::new();
        let mut ping_window = HANDSHAKE_TIMEOUT;
        let silence = tokio::time::sleep(HANDSHAKE_TIMEOUT);
        tokio::pin!(silence);

        loop {
            tokio::select! {
                incoming = read.next() => {
                    let text = match incoming {
                        Some(Ok(Message::Text(text))) => text,
                        Some(Ok(Message::Close(_))) | None => {
                            return Ok(LinkEnd::Lost("transport close".to_owned()));
                        }
                        Some(Ok(_)) => continue,
                        Some(Err(e)) => return Err(e.into()),
                    };

                    let packet = match EnginePacket::decode(text.as_str()) {
                        Ok(packet) => packet,
                        Err(e) => {
                            warn!("Ignoring relay frame: {}", e);
                            continue;
                        }
                    };

                    match packet {
                        EnginePacket::Open(handshake) => {
                            debug!("Engine session {} open", handshake.sid);
                            ping_window = handshake.ping_window();
                            silence.as_mut().reset(Instant::now() + ping_window);
                            let connect = SocketPacket::connect_with_token(self.token.as_deref());
                            write.send(frame(EnginePacket::Message(connect))?).await?;
                        }
                        EnginePacket::Ping => {
                            silence.as_mut().reset(Instant::now() + ping_window);
                            write.send(frame(EnginePacket::Pong)?).await?;
                        }
                        EnginePacket::Close => {
                            return Ok(LinkEnd::Lost("transport close".to_owned()));
                        }
                        EnginePacket::Message(SocketPacket::Connect(_)) => {
                            acknowledged = true;
                            self.observer.on_relay_event(RelayEvent::Connect);
                            for command in pending.drain(..) {
                                write.send(emit(&command)?).await?;
                            }
                        }
                        EnginePacket::Message(SocketPacket::Event { name, args }) => {
                            match RelayEvent::from_named(&name, args) {
                                Some(event) => self.observer.on_relay_event(event),
                                None => debug!("Ignoring relay event `{}`", name),
                            }
                        }
                        EnginePacket::Message(SocketPacket::Disconnect) => {
                            return Ok(LinkEnd::Lost("io server disconnect".to_owned()));
                        }
                        EnginePacket::Message(SocketPacket::ConnectError(data)) => {
                            return Ok(LinkEnd::Lost(format!("connect error: {data}")));
                        }
                        EnginePacket::Message(SocketPacket::Ack)
                        | EnginePacket::Pong
                        | EnginePacket::Upgrade
                        | EnginePacket::Noop => {}
                    }
                }

                command = self.outbound.recv() => match command {
                    Some(command) if acknowledged => write.send(emit(&command)?).await?,
                    Some(command) => pending.push(command),
                    None => {
                        let _ = write
                            .send(frame(EnginePacket::Message(SocketPacket::Disconnect))?)
                            .await;
                        let _ = write.close().await;
                        return Ok(LinkEnd::Closed);
                    }
                },

                _ = &mut silence => {
                    return Ok(LinkEnd::Lost("ping timeout".to_owned()));
                }
            }
        }
    }
}

fn frame(packet: EnginePacket) -> Result<Message, ChannelError> {
    Ok(Message::Text(packet.encode()?.into()))
}

fn emit(command: &RelayCommand) -> Result<Message, ChannelError> {
    let args = command.args().map_err(FrameError::from)?;
    frame(EnginePacket::Message(SocketPacket::event(
        command.event_name(),
        args,
    )))
}
