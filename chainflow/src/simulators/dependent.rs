//! Randomized-latency stand-in for a query that depends on a prior result.

use super::{Amount, DependentWork, ProductQuery};
use crate::config::SimulatorConfig;
use crate::errors::StageError;
use async_trait::async_trait;
use rand::Rng;
use tracing::{debug, info};

/// Simulates a stored-procedure lookup parameterized by a price.
#[derive(Debug, Clone)]
pub struct DependentWorkSimulator {
    config: SimulatorConfig,
}

impl DependentWorkSimulator {
    /// Creates a new simulator.
    ///
    /// Only the stage two latency and the count range are used.
    #[must_use]
    pub const fn new(config: SimulatorConfig) -> Self {
        Self { config }
    }
}

impl Default for DependentWorkSimulator {
    fn default() -> Self {
        Self::new(SimulatorConfig::default())
    }
}

#[async_trait]
impl DependentWork for DependentWorkSimulator {
    async fn query(&self, call_id: u32, amount: Amount) -> Result<ProductQuery, StageError> {
        if self.config.count_min >= self.config.count_max {
            return Err(StageError::stage_two(format!(
                "empty product count range {}..{}",
                self.config.count_min, self.config.count_max
            )));
        }

        let (delay, count) = {
            let mut rng = rand::thread_rng();
            (
                self.config.stage_two.sample(&mut rng),
                rng.gen_range(self.config.count_min..self.config.count_max),
            )
        };

        debug!(call_id, %amount, ?delay, "Running dependent query");
        tokio::time::sleep(delay).await;

        let result = ProductQuery::new(call_id, count, amount);
        info!(call_id, count, %amount, "Dependent query complete");
        Ok(result)
    }
}
