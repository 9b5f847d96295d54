//! Randomized-latency stand-in for a remote call.

use super::{Amount, WorkSource};
use crate::config::LatencyRange;
use crate::errors::StageError;
use async_trait::async_trait;
use tracing::{debug, info};

/// Simulates a web-service call that returns a price.
#[derive(Debug, Clone, Default)]
pub struct WorkSimulator {
    latency: LatencyRange,
}

impl WorkSimulator {
    /// Creates a new simulator with the given latency range.
    #[must_use]
    pub const fn new(latency: LatencyRange) -> Self {
        Self { latency }
    }

    /// Returns the configured latency range.
    #[must_use]
    pub const fn latency(&self) -> LatencyRange {
        self.latency
    }
}

#[async_trait]
impl WorkSource for WorkSimulator {
    async fn fetch(&self, call_id: u32) -> Result<Amount, StageError> {
        // ThreadRng is not Send; draw everything before the await.
        let (delay, amount) = {
            let mut rng = rand::thread_rng();
            (self.latency.sample(&mut rng), Amount::random(&mut rng))
        };

        debug!(call_id, ?delay, "Calling web service");
        tokio::time::sleep(delay).await;
        info!(call_id, %amount, ?delay, "Web service call complete");

        Ok(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_fetch_waits_within_latency_range() {
        let sim = WorkSimulator::default();
        let start = Instant::now();

        let amount = sim.fetch(3).await.unwrap();

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(2000));
        assert!(elapsed <= Duration::from_millis(4000) + Duration::from_millis(5));
        assert!(amount.cents() < crate::simulators::MAX_AMOUNT_CENTS);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_default_never_fails() {
        let sim = WorkSimulator::new(LatencyRange::fixed(10));
        for _ in 0..20 {
            tokio_test::assert_ok!(sim.fetch_default().await);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_fetches_do_not_serialize() {
        let sim = std::sync::Arc::new(WorkSimulator::new(LatencyRange::fixed(100)));
        let start = Instant::now();

        let calls = (1..=4).map(|id| {
            let sim = sim.clone();
            tokio::spawn(async move { sim.fetch(id).await })
        });
        for result in futures::future::join_all(calls).await {
            assert!(result.unwrap().is_ok());
        }

        assert!(start.elapsed() < Duration::from_millis(200));
    }
}
