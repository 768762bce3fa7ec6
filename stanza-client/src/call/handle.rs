use crate::call::{CallCommand, CallError};
use stanza_core::SignalingState;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Owner-side view of a running call.
///
/// Dropping the handle stops the call as well.
pub struct CallHandle {
    command_tx: mpsc::Sender<CallCommand>,
    state_rx: watch::Receiver<SignalingState>,
    task: JoinHandle<()>,
}

impl CallHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<CallCommand>,
        state_rx: watch::Receiver<SignalingState>,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            command_tx,
            state_rx,
            task,
        }
    }

    pub fn state(&self) -> SignalingState {
        *self.state_rx.borrow()
    }

    /// Latest-value subscription to state changes.
    pub fn subscribe(&self) -> watch::Receiver<SignalingState> {
        self.state_rx.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub async fn wait_for_state(
        &self,
        state: SignalingState,
        timeout: Duration,
    ) -> Result<(), CallError> {
        let mut rx = self.state_rx.clone();
        match tokio::time::timeout(timeout, rx.wait_for(|s| *s == state)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(_)) => Err(CallError::Stopped),
            Err(_) => Err(CallError::Timeout { state, timeout }),
        }
    }

    /// Cancel any pending retry, leave the relay, close the peer connection.
    pub async fn shutdown(self) -> Result<(), CallError> {
        // A send error only means the controller has already stopped.
        let _ = self.command_tx.send(CallCommand::Shutdown).await;
        self.task.await.map_err(|_| CallError::Stopped)
    }
}
