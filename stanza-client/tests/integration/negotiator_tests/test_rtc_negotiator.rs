use std::sync::Arc;

use stanza_client::{
    NegotiationError, NegotiatorFactory, RtcNegotiator, RtcNegotiatorFactory, SessionNegotiator,
};
use stanza_core::{IceServerConfig, MediaCapabilities, MediaDirection, SdpKind};

use super::RecordingNegotiationObserver;
use crate::integration::init_tracing;

fn origin(sdp: &str) -> Option<&str> {
    sdp.lines().find(|line| line.starts_with("o="))
}

async fn negotiator() -> (RtcNegotiator, RecordingNegotiationObserver) {
    let observer = RecordingNegotiationObserver::default();
    let negotiator = RtcNegotiator::new(&[], Arc::new(observer.clone()))
        .await
        .expect("peer connection should build");
    (negotiator, observer)
}

#[tokio::test]
async fn test_offer_answer_round_trip() {
    init_tracing();

    let (caller, _) = negotiator().await;
    let (callee, _) = negotiator().await;
    let media = MediaCapabilities::default();

    caller.declare_media(media).await.expect("caller media");
    callee.declare_media(media).await.expect("callee media");
    assert_eq!(caller.local_tracks().await.len(), 1, "only audio sends");

    let offer = caller.create_offer().await.expect("offer");
    assert_eq!(offer.kind, SdpKind::Offer);
    assert!(offer.sdp.contains("m=audio"));
    assert!(offer.sdp.contains("m=video"));

    caller
        .set_local_description(offer.clone())
        .await
        .expect("caller local");
    callee
        .set_remote_description(offer.clone())
        .await
        .expect("callee remote");

    let answer = callee.create_answer().await.expect("answer");
    assert_eq!(answer.kind, SdpKind::Answer);
    callee
        .set_local_description(answer.clone())
        .await
        .expect("callee local");
    caller
        .set_remote_description(answer.clone())
        .await
        .expect("caller remote");

    // Gathered candidates may be folded into the stored descriptions.
    let caller_local = caller.local_description().await.expect("caller local stored");
    let callee_remote = callee.remote_description().await.expect("callee remote stored");
    assert_eq!(caller_local.kind, SdpKind::Offer);
    assert_eq!(callee_remote.kind, SdpKind::Offer);
    assert_eq!(origin(&caller_local.sdp), origin(&offer.sdp));
    assert_eq!(origin(&callee_remote.sdp), origin(&offer.sdp));

    let caller_remote = caller.remote_description().await.expect("caller remote stored");
    assert_eq!(caller_remote.kind, SdpKind::Answer);
    assert_eq!(origin(&caller_remote.sdp), origin(&answer.sdp));

    caller.dispose().await.expect("caller dispose");
    callee.dispose().await.expect("callee dispose");
}

#[tokio::test]
async fn test_declared_directions_shape_the_offer() {
    init_tracing();

    let (caller, _) = negotiator().await;
    caller
        .declare_media(MediaCapabilities {
            audio: Some(MediaDirection::RecvOnly),
            video: None,
        })
        .await
        .expect("media");

    let offer = caller.create_offer().await.expect("offer");
    assert!(offer.sdp.contains("m=audio"));
    assert!(!offer.sdp.contains("m=video"));
    assert!(offer.sdp.contains("a=recvonly"));
    assert!(caller.local_tracks().await.is_empty());

    caller.dispose().await.expect("dispose");
}

#[tokio::test]
async fn test_answer_without_remote_offer_fails() {
    init_tracing();

    let (callee, _) = negotiator().await;
    callee
        .declare_media(MediaCapabilities::default())
        .await
        .expect("media");

    assert!(callee.create_answer().await.is_err());
    assert!(callee.remote_description().await.is_none());

    callee.dispose().await.expect("dispose");
}

#[tokio::test]
async fn test_disposed_negotiator_refuses_work() {
    init_tracing();

    let (caller, observer) = negotiator().await;
    caller.dispose().await.expect("first dispose");
    caller.dispose().await.expect("second dispose is a no-op");

    assert!(matches!(
        caller.create_offer().await,
        Err(NegotiationError::Disposed)
    ));
    assert!(matches!(
        caller.declare_media(MediaCapabilities::default()).await,
        Err(NegotiationError::Disposed)
    ));
    assert!(observer.candidates().is_empty());
}

#[tokio::test]
async fn test_factory_rejects_bad_ice_server() {
    init_tracing();

    let factory = RtcNegotiatorFactory::new(vec![IceServerConfig {
        urls: vec!["http://stun.example.org".to_owned()],
        username: None,
        credential: None,
    }]);

    let result = factory
        .create(Arc::new(RecordingNegotiationObserver::default()))
        .await;
    assert!(matches!(result, Err(NegotiationError::InvalidIceServer(url)) if url == "http://stun.example.org"));
}
