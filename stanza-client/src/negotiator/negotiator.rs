use crate::negotiator::NegotiationError;
use async_trait::async_trait;
use bytes::Bytes;
use stanza_core::{
    IceCandidate, MediaCapabilities, PeerConnectionStatus, RemoteTrack, SessionDescription,
};
use std::sync::Arc;

/// Notifications raised by the media engine outside of any negotiation step.
///
/// Called from media engine tasks. Implementations must not block.
pub trait NegotiationObserver: Send + Sync {
    fn on_ice_candidate(&self, candidate: IceCandidate);

    fn on_connection_state(&self, status: PeerConnectionStatus);

    fn on_remote_track(&self, track: RemoteTrack);

    fn on_data_channel_message(&self, label: String, data: Bytes);
}

/// Offer/answer negotiation against one peer connection.
#[async_trait]
pub trait SessionNegotiator: Send + Sync {
    /// Add a transceiver for every media line the peer takes part in.
    async fn declare_media(&self, media: MediaCapabilities) -> Result<(), NegotiationError>;

    async fn create_offer(&self) -> Result<SessionDescription, NegotiationError>;

    /// Must only be called once a remote offer has been applied.
    async fn create_answer(&self) -> Result<SessionDescription, NegotiationError>;

    async fn set_local_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), NegotiationError>;

    async fn set_remote_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), NegotiationError>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), NegotiationError>;

    async fn local_description(&self) -> Option<SessionDescription>;

    async fn remote_description(&self) -> Option<SessionDescription>;

    /// Close the peer connection. The negotiator is unusable afterwards.
    async fn dispose(&self) -> Result<(), NegotiationError>;
}

/// Builds a fresh negotiator for every session.
#[async_trait]
pub trait NegotiatorFactory: Send + Sync {
    async fn create(
        &self,
        observer: Arc<dyn NegotiationObserver>,
    ) -> Result<Arc<dyn SessionNegotiator>, NegotiationError>;
}
