//! Configuration types for simulators and fan-out runs.

use crate::errors::ChainflowError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default number of pipelines launched by a fan-out.
pub const DEFAULT_PIPELINES: usize = 5;

/// An inclusive range of simulated latencies in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyRange {
    /// Lower bound in milliseconds.
    #[serde(default = "default_min_ms")]
    pub min_ms: u64,
    /// Upper bound in milliseconds (inclusive).
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

fn default_min_ms() -> u64 {
    2000
}

fn default_max_ms() -> u64 {
    4000
}

impl Default for LatencyRange {
    fn default() -> Self {
        Self {
            min_ms: default_min_ms(),
            max_ms: default_max_ms(),
        }
    }
}

impl LatencyRange {
    /// Creates a new latency range.
    #[must_use]
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// A range that always yields the same latency.
    #[must_use]
    pub const fn fixed(ms: u64) -> Self {
        Self::new(ms, ms)
    }

    /// Samples a latency from the range.
    #[must_use]
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.min_ms >= self.max_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rng.gen_range(self.min_ms..=self.max_ms))
    }

    /// Returns the lower bound as a duration.
    #[must_use]
    pub const fn min(&self) -> Duration {
        Duration::from_millis(self.min_ms)
    }

    /// Returns the upper bound as a duration.
    #[must_use]
    pub const fn max(&self) -> Duration {
        Duration::from_millis(self.max_ms)
    }

    fn validate(&self, label: &str) -> Result<(), ChainflowError> {
        if self.min_ms > self.max_ms {
            return Err(ChainflowError::Config(format!(
                "{label} latency min ({}ms) exceeds max ({}ms)",
                self.min_ms, self.max_ms
            )));
        }
        Ok(())
    }
}

/// Configuration shared by the work simulators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Latency of the initial call.
    #[serde(default)]
    pub stage_one: LatencyRange,
    /// Latency of the dependent call.
    #[serde(default)]
    pub stage_two: LatencyRange,
    /// Smallest product count reported by the dependent call.
    #[serde(default = "default_count_min")]
    pub count_min: u32,
    /// Exclusive upper bound of the product count.
    #[serde(default = "default_count_max")]
    pub count_max: u32,
}

fn default_count_min() -> u32 {
    5
}

fn default_count_max() -> u32 {
    20
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            stage_one: LatencyRange::default(),
            stage_two: LatencyRange::default(),
            count_min: default_count_min(),
            count_max: default_count_max(),
        }
    }
}

impl SimulatorConfig {
    /// Creates a new simulator configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the stage one latency.
    #[must_use]
    pub fn with_stage_one(mut self, latency: LatencyRange) -> Self {
        self.stage_one = latency;
        self
    }

    /// Sets the stage two latency.
    #[must_use]
    pub fn with_stage_two(mut self, latency: LatencyRange) -> Self {
        self.stage_two = latency;
        self
    }

    /// Sets the product count range (`min..max`).
    #[must_use]
    pub fn with_count_range(mut self, min: u32, max: u32) -> Self {
        self.count_min = min;
        self.count_max = max;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ChainflowError::Config`] if a range is inverted or empty.
    pub fn validate(&self) -> Result<(), ChainflowError> {
        self.stage_one.validate("stage one")?;
        self.stage_two.validate("stage two")?;
        if self.count_min >= self.count_max {
            return Err(ChainflowError::Config(format!(
                "product count range {}..{} is empty",
                self.count_min, self.count_max
            )));
        }
        Ok(())
    }
}

/// Configuration for a fan-out run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanOutConfig {
    /// Number of pipelines to launch.
    #[serde(default = "default_pipelines")]
    pub pipelines: usize,
    /// Simulator settings.
    #[serde(default)]
    pub simulators: SimulatorConfig,
}

fn default_pipelines() -> usize {
    DEFAULT_PIPELINES
}

impl Default for FanOutConfig {
    fn default() -> Self {
        Self {
            pipelines: default_pipelines(),
            simulators: SimulatorConfig::default(),
        }
    }
}

impl FanOutConfig {
    /// Creates a new fan-out configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of pipelines.
    #[must_use]
    pub fn with_pipelines(mut self, pipelines: usize) -> Self {
        self.pipelines = pipelines;
        self
    }

    /// Sets the simulator configuration.
    #[must_use]
    pub fn with_simulators(mut self, simulators: SimulatorConfig) -> Self {
        self.simulators = simulators;
        self
    }

    /// Loads a configuration from a JSON file.
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ChainflowError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ChainflowError::Config`] if no pipelines are requested,
    /// the count does not fit a pipeline index, or the simulator settings
    /// are invalid.
    pub fn validate(&self) -> Result<(), ChainflowError> {
        if self.pipelines == 0 {
            return Err(ChainflowError::Config(
                "at least one pipeline is required".to_string(),
            ));
        }
        if u32::try_from(self.pipelines).is_err() {
            return Err(ChainflowError::Config(format!(
                "{} pipelines exceeds the maximum index",
                self.pipelines
            )));
        }
        self.simulators.validate()
    }
}
