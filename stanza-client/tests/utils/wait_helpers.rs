use std::time::Duration;

/// Poll interval for condition waits (ms).
pub const POLL_INTERVAL_MS: u64 = 10;

/// Timeout for steps that only involve in-process tasks (ms).
pub const LOCAL_TIMEOUT_MS: u64 = 2000;

/// Timeout for steps that go through the mock relay (ms).
pub const RELAY_TIMEOUT_MS: u64 = 5000;

/// Timeout for ICE connectivity between two local peers (ms).
pub const CONNECTION_TIMEOUT_MS: u64 = 20000;

/// Poll `condition` until it holds or `timeout_ms` passes.
pub async fn wait_until(timeout_ms: u64, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);

    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
    }
}

/// Give spawned tasks a chance to drain their queues.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}
