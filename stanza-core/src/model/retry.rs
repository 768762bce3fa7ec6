use crate::config::RetryPolicy;
use std::time::Duration;

/// What to do about a lost relay connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Reconnect the transport after `delay`, keeping the session.
    Retry { attempt: u32, delay: Duration },
    /// Budget exhausted: tear everything down and start a new session.
    Restart,
}

/// Bounded reconnect budget for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryBudget {
    attempts: u32,
    max_retries: u32,
    delay: Duration,
    enabled: bool,
}

impl RetryBudget {
    pub fn new(policy: &RetryPolicy) -> Self {
        Self {
            attempts: 0,
            max_retries: policy.max_retries,
            delay: policy.delay(),
            enabled: policy.enabled,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    /// Consume one unit of budget for a disconnect.
    ///
    /// The disconnect that brings the counter up to `max_retries` escalates to
    /// a restart; a disabled budget always restarts.
    pub fn on_disconnect(&mut self) -> RetryDecision {
        if !self.enabled {
            return RetryDecision::Restart;
        }

        self.attempts += 1;
        if self.attempts < self.max_retries {
            RetryDecision::Retry {
                attempt: self.attempts,
                delay: self.delay,
            }
        } else {
            RetryDecision::Restart
        }
    }
}
