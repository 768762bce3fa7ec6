use crate::call::SessionMailbox;
use crate::negotiator::{NegotiationError, SessionNegotiator};
use stanza_core::{
    IceCandidate, MediaCapabilities, NegotiationOutcome, NegotiationStep, SdpKind,
    SessionDescription,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// One unit of negotiator work.
#[derive(Debug, Clone, PartialEq)]
pub enum NegotiationJob {
    DeclareMedia(MediaCapabilities),
    /// Create an offer, apply it locally, report it.
    CreateOffer,
    /// Apply the remote offer, then create, apply and report the answer.
    AnswerOffer { sdp: String },
    ApplyAnswer { sdp: String },
    AddCandidate(IceCandidate),
}

/// Runs negotiator jobs one at a time, in submission order.
///
/// A job only starts once the previous one has finished, so a remote offer is
/// always applied before the answer is created and a remote candidate never
/// overtakes the description it belongs to.
pub struct NegotiationWorker {
    jobs: mpsc::UnboundedSender<NegotiationJob>,
    task: JoinHandle<()>,
}

impl NegotiationWorker {
    pub fn spawn(negotiator: Arc<dyn SessionNegotiator>, mailbox: SessionMailbox) -> Self {
        let (jobs, mut rx) = mpsc::unbounded_channel::<NegotiationJob>();

        let task = tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                run_job(negotiator.as_ref(), &mailbox, job).await;
            }
            debug!("Negotiation worker for session {} finished", mailbox.epoch());
        });

        Self { jobs, task }
    }

    pub fn submit(&self, job: NegotiationJob) {
        if self.jobs.send(job).is_err() {
            warn!("Negotiation worker is gone, dropping job");
        }
    }

    /// Stop without running queued jobs.
    pub async fn shutdown(self) {
        drop(self.jobs);
        self.task.abort();
        let _ = self.task.await;
    }
}

async fn run_job(negotiator: &dyn SessionNegotiator, mailbox: &SessionMailbox, job: NegotiationJob) {
    let result = match job {
        NegotiationJob::DeclareMedia(media) => negotiator
            .declare_media(media)
            .await
            .map_err(|e| (NegotiationStep::DeclareMedia, e)),

        NegotiationJob::CreateOffer => create_offer(negotiator, mailbox).await,

        NegotiationJob::AnswerOffer { sdp } => answer_offer(negotiator, mailbox, sdp).await,

        NegotiationJob::ApplyAnswer { sdp } => {
            apply_remote(negotiator, mailbox, SessionDescription::answer(sdp)).await
        }

        NegotiationJob::AddCandidate(candidate) => negotiator
            .add_ice_candidate(candidate)
            .await
            .map_err(|e| (NegotiationStep::AddIceCandidate, e)),
    };

    if let Err((step, e)) = result {
        mailbox.post_outcome(NegotiationOutcome::Failed {
            step,
            reason: e.to_string(),
        });
    }
}

type StepResult = Result<(), (NegotiationStep, NegotiationError)>;

async fn create_offer(negotiator: &dyn SessionNegotiator, mailbox: &SessionMailbox) -> StepResult {
    let offer = negotiator
        .create_offer()
        .await
        .map_err(|e| (NegotiationStep::CreateOffer, e))?;
    let sdp = offer.sdp.clone();
    negotiator
        .set_local_description(offer)
        .await
        .map_err(|e| (NegotiationStep::SetLocalDescription, e))?;

    mailbox.post_outcome(NegotiationOutcome::OfferReady { sdp });
    Ok(())
}

async fn answer_offer(
    negotiator: &dyn SessionNegotiator,
    mailbox: &SessionMailbox,
    sdp: String,
) -> StepResult {
    apply_remote(negotiator, mailbox, SessionDescription::offer(sdp)).await?;

    let answer = negotiator
        .create_answer()
        .await
        .map_err(|e| (NegotiationStep::CreateAnswer, e))?;
    let sdp = answer.sdp.clone();
    negotiator
        .set_local_description(answer)
        .await
        .map_err(|e| (NegotiationStep::SetLocalDescription, e))?;

    mailbox.post_outcome(NegotiationOutcome::AnswerReady { sdp });
    Ok(())
}

async fn apply_remote(
    negotiator: &dyn SessionNegotiator,
    mailbox: &SessionMailbox,
    description: SessionDescription,
) -> StepResult {
    let kind: SdpKind = description.kind;
    negotiator
        .set_remote_description(description)
        .await
        .map_err(|e| (NegotiationStep::SetRemoteDescription, e))?;

    mailbox.post_outcome(NegotiationOutcome::RemoteDescriptionApplied { kind });
    Ok(())
}
