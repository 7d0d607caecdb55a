//! Injectable pauses
//!
//! Route53 rejects bursts of calls from the smoke suite with throttling
//! errors, so every Route53 operation waits a fixed amount first. Polling
//! loops use the same seam. Tests swap in a recording delay and never sleep.

use async_trait::async_trait;
use std::time::Duration;

/// Something that can pause the current task
#[async_trait]
pub trait Delay: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real delay backed by `tokio::time::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test]
    async fn test_zero_delay_returns_immediately() {
        let start = Instant::now();
        TokioDelay.sleep(Duration::ZERO).await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_delay_sleeps() {
        let start = Instant::now();
        TokioDelay.sleep(Duration::from_millis(20)).await;
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
