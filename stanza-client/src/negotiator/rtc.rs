use crate::negotiator::{
    NegotiationError, NegotiationObserver, NegotiatorFactory, SessionNegotiator,
};
use async_trait::async_trait;
use bytes::Bytes;
use stanza_core::{
    ClientConfig, IceCandidate, IceServerConfig, MediaCapabilities, MediaDirection, MediaKind,
    PeerConnectionStatus, RemoteTrack, SdpKind, SessionDescription,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8, MediaEngine};
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::sdp_type::RTCSdpType;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_codec::{RTCRtpCodecCapability, RTPCodecType};
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;
use webrtc::rtp_transceiver::RTCRtpTransceiverInit;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_remote::TrackRemote;

/// Stream id shared by every local track of a peer.
const LOCAL_STREAM_ID: &str = "stanza";

/// Negotiator backed by a webrtc-rs peer connection.
pub struct RtcNegotiator {
    peer_connection: Arc<RTCPeerConnection>,
    local_tracks: Mutex<Vec<Arc<TrackLocalStaticSample>>>,
    disposed: AtomicBool,
}

impl RtcNegotiator {
    /// Build the peer connection and route its callbacks into `observer`.
    pub async fn new(
        ice_servers: &[IceServerConfig],
        observer: Arc<dyn NegotiationObserver>,
    ) -> Result<Self, NegotiationError> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: ice_servers
                .iter()
                .map(rtc_ice_server)
                .collect::<Result<_, _>>()?,
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        let state_observer = observer.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let observer = state_observer.clone();

                Box::pin(async move {
                    info!("Peer connection state changed: {:?}", s);
                    observer.on_connection_state(connection_status(s));
                })
            },
        ));

        let ice_observer = observer.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let observer = ice_observer.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                observer.on_ice_candidate(IceCandidate {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid,
                    sdp_mline_index: init.sdp_mline_index,
                });
            })
        }));

        let track_observer = observer.clone();
        peer_connection.on_track(Box::new(move |track: Arc<TrackRemote>, _, _| {
            let observer = track_observer.clone();

            Box::pin(async move {
                let kind = match track.kind() {
                    RTPCodecType::Audio => MediaKind::Audio,
                    RTPCodecType::Video => MediaKind::Video,
                    other => {
                        debug!("Ignoring remote track of kind {:?}", other);
                        return;
                    }
                };
                observer.on_remote_track(RemoteTrack {
                    kind,
                    track_id: track.id(),
                    stream_id: track.stream_id(),
                });
            })
        }));

        let dc_observer = observer;
        peer_connection.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
            let observer = dc_observer.clone();

            Box::pin(async move {
                let label = dc.label().to_owned();
                debug!("Remote opened data channel '{}'", label);

                dc.on_message(Box::new(move |msg: DataChannelMessage| {
                    let observer = observer.clone();
                    let label = label.clone();
                    Box::pin(async move {
                        let data = Bytes::from(msg.data.to_vec());
                        observer.on_data_channel_message(label, data);
                    })
                }));
            })
        }));

        Ok(Self {
            peer_connection,
            local_tracks: Mutex::new(Vec::new()),
            disposed: AtomicBool::new(false),
        })
    }

    /// Tracks created by `declare_media`. Captured samples are written here.
    pub async fn local_tracks(&self) -> Vec<Arc<TrackLocalStaticSample>> {
        self.local_tracks.lock().await.clone()
    }

    fn ensure_open(&self) -> Result<(), NegotiationError> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(NegotiationError::Disposed);
        }
        Ok(())
    }
}

#[async_trait]
impl SessionNegotiator for RtcNegotiator {
    async fn declare_media(&self, media: MediaCapabilities) -> Result<(), NegotiationError> {
        self.ensure_open()?;

        for (kind, direction) in media.lines() {
            let init = Some(RTCRtpTransceiverInit {
                direction: transceiver_direction(direction),
                send_encodings: vec![],
            });

            if direction.sends() {
                let track = Arc::new(local_track(kind));
                self.peer_connection
                    .add_transceiver_from_track(
                        track.clone() as Arc<dyn TrackLocal + Send + Sync>,
                        init,
                    )
                    .await?;
                self.local_tracks.lock().await.push(track);
            } else {
                self.peer_connection
                    .add_transceiver_from_kind(codec_type(kind), init)
                    .await?;
            }
            debug!("Declared {} as {:?}", kind, direction);
        }
        Ok(())
    }

    async fn create_offer(&self) -> Result<SessionDescription, NegotiationError> {
        self.ensure_open()?;
        let offer = self.peer_connection.create_offer(None).await?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn create_answer(&self) -> Result<SessionDescription, NegotiationError> {
        self.ensure_open()?;
        let answer = self.peer_connection.create_answer(None).await?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn set_local_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), NegotiationError> {
        self.ensure_open()?;
        self.peer_connection
            .set_local_description(rtc_description(description)?)
            .await?;
        Ok(())
    }

    async fn set_remote_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), NegotiationError> {
        self.ensure_open()?;
        self.peer_connection
            .set_remote_description(rtc_description(description)?)
            .await?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), NegotiationError> {
        self.ensure_open()?;
        self.peer_connection
            .add_ice_candidate(RTCIceCandidateInit {
                candidate: candidate.candidate,
                sdp_mid: candidate.sdp_mid,
                sdp_mline_index: candidate.sdp_mline_index,
                username_fragment: None,
            })
            .await?;
        Ok(())
    }

    async fn local_description(&self) -> Option<SessionDescription> {
        self.peer_connection
            .local_description()
            .await
            .and_then(session_description)
    }

    async fn remote_description(&self) -> Option<SessionDescription> {
        self.peer_connection
            .remote_description()
            .await
            .and_then(session_description)
    }

    async fn dispose(&self) -> Result<(), NegotiationError> {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.peer_connection.close().await?;
        Ok(())
    }
}

/// Creates one `RtcNegotiator` per session.
#[derive(Clone)]
pub struct RtcNegotiatorFactory {
    ice_servers: Vec<IceServerConfig>,
}

impl RtcNegotiatorFactory {
    pub fn new(ice_servers: Vec<IceServerConfig>) -> Self {
        Self { ice_servers }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.ice_servers.clone())
    }
}

#[async_trait]
impl NegotiatorFactory for RtcNegotiatorFactory {
    async fn create(
        &self,
        observer: Arc<dyn NegotiationObserver>,
    ) -> Result<Arc<dyn SessionNegotiator>, NegotiationError> {
        let negotiator = RtcNegotiator::new(&self.ice_servers, observer).await?;
        Ok(Arc::new(negotiator))
    }
}

fn rtc_ice_server(server: &IceServerConfig) -> Result<RTCIceServer, NegotiationError> {
    if let Some(bad) = server.urls.iter().find(|url| {
        !["stun:", "stuns:", "turn:", "turns:"]
            .iter()
            .any(|scheme| url.starts_with(scheme))
    }) {
        return Err(NegotiationError::InvalidIceServer(bad.clone()));
    }

    Ok(RTCIceServer {
        urls: server.urls.clone(),
        username: server.username.clone().unwrap_or_default(),
        credential: server.credential.clone().unwrap_or_default(),
        ..Default::default()
    })
}

fn rtc_description(description: SessionDescription) -> Result<RTCSessionDescription, NegotiationError> {
    let rtc = match description.kind {
        SdpKind::Offer => RTCSessionDescription::offer(description.sdp)?,
        SdpKind::Answer => RTCSessionDescription::answer(description.sdp)?,
    };
    Ok(rtc)
}

fn session_description(rtc: RTCSessionDescription) -> Option<SessionDescription> {
    match rtc.sdp_type {
        RTCSdpType::Offer => Some(SessionDescription::offer(rtc.sdp)),
        RTCSdpType::Answer => Some(SessionDescription::answer(rtc.sdp)),
        _ => None,
    }
}

fn connection_status(state: RTCPeerConnectionState) -> PeerConnectionStatus {
    match state {
        RTCPeerConnectionState::Connecting => PeerConnectionStatus::Connecting,
        RTCPeerConnectionState::Connected => PeerConnectionStatus::Connected,
        RTCPeerConnectionState::Disconnected => PeerConnectionStatus::Disconnected,
        RTCPeerConnectionState::Failed => PeerConnectionStatus::Failed,
        RTCPeerConnectionState::Closed => PeerConnectionStatus::Closed,
        _ => PeerConnectionStatus::New,
    }
}

fn transceiver_direction(direction: MediaDirection) -> RTCRtpTransceiverDirection {
    match direction {
        MediaDirection::SendRecv => RTCRtpTransceiverDirection::Sendrecv,
        MediaDirection::SendOnly => RTCRtpTransceiverDirection::Sendonly,
        MediaDirection::RecvOnly => RTCRtpTransceiverDirection::Recvonly,
        MediaDirection::Inactive => RTCRtpTransceiverDirection::Inactive,
    }
}

fn codec_type(kind: MediaKind) -> RTPCodecType {
    match kind {
        MediaKind::Audio => RTPCodecType::Audio,
        MediaKind::Video => RTPCodecType::Video,
    }
}

fn local_track(kind: MediaKind) -> TrackLocalStaticSample {
    let (capability, id) = match kind {
        MediaKind::Audio => (
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                clock_rate: 48000,
                channels: 2,
                ..Default::default()
            },
            "audio",
        ),
        MediaKind::Video => (
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_VP8.to_owned(),
                clock_rate: 90000,
                ..Default::default()
            },
            "video",
        ),
    };
    TrackLocalStaticSample::new(capability, id.to_owned(), LOCAL_STREAM_ID.to_owned())
}
