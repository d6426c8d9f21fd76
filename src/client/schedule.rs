//! Timer primitive for the polling loop.
//!
//! The browser has no tokio reactor, so WASM builds sleep on `setTimeout`
//! through gloo-timers; native builds (and tests) use tokio's timer, which
//! honours paused test time.

use std::time::Duration;

/// Waits for `duration` without blocking the event loop.
#[cfg(target_arch = "wasm32")]
pub async fn sleep(duration: Duration) {
    gloo_timers::future::sleep(duration).await;
}

/// Waits for `duration` without blocking the event loop.
#[cfg(not(target_arch = "wasm32"))]
pub async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_sleep_advances_paused_time() {
        let start = tokio::time::Instant::now();
        sleep(Duration::from_secs(10)).await;
        assert_eq!(start.elapsed(), Duration::from_secs(10));
    }
}
