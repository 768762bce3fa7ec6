use crate::call::SessionMailbox;
use stanza_core::CallInput;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// The single outstanding reconnect timer.
#[derive(Default)]
pub struct RetryTimer {
    task: Option<JoinHandle<()>>,
}

impl RetryTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Post `RetryElapsed` to `mailbox` after `delay`, replacing any pending timer.
    pub fn schedule(&mut self, delay: Duration, mailbox: SessionMailbox) {
        self.cancel();
        self.task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            mailbox.post(CallInput::RetryElapsed);
        }));
    }

    /// Returns true when a timer was still waiting.
    pub fn cancel(&mut self) -> bool {
        let Some(task) = self.task.take() else {
            return false;
        };
        let was_pending = !task.is_finished();
        task.abort();
        if was_pending {
            debug!("Cancelled pending reconnect");
        }
        was_pending
    }

    pub fn is_pending(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for RetryTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
