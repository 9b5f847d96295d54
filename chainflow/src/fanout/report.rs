//! Collected outcomes of a fan-out run.

use crate::errors::{AggregationError, PipelineFailure};
use crate::pipeline::{PipelineIndex, PipelineOutcome};
use crate::simulators::ProductQuery;
use chrono::{DateTime, Utc};
use std::time::Duration;
use uuid::Uuid;

/// Outcomes of every pipeline in a fan-out, ordered by index.
///
/// Only built after the join barrier, so it is never partially filled.
#[derive(Debug, Clone)]
pub struct FanOutReport {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    outcomes: Vec<PipelineOutcome>,
    elapsed: Duration,
}

impl FanOutReport {
    /// Creates a report. `outcomes` must be in index order.
    #[must_use]
    pub fn new(
        run_id: Uuid,
        started_at: DateTime<Utc>,
        outcomes: Vec<PipelineOutcome>,
        elapsed: Duration,
    ) -> Self {
        debug_assert!(outcomes
            .iter()
            .enumerate()
            .all(|(slot, outcome)| outcome.index.slot() == slot));

        Self {
            run_id,
            started_at,
            outcomes,
            elapsed,
        }
    }

    /// Returns the run identifier.
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Returns when the fan-out started.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns the wall-clock time of the whole fan-out.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Returns every outcome in index order.
    #[must_use]
    pub fn outcomes(&self) -> &[PipelineOutcome] {
        &self.outcomes
    }

    /// Returns the outcome of the pipeline at `index`.
    #[must_use]
    pub fn get(&self, index: PipelineIndex) -> Option<&PipelineOutcome> {
        self.outcomes.get(index.slot())
    }

    /// Returns the number of pipelines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Returns true if no pipelines were run.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Iterates over successful query results with their index.
    pub fn successes(&self) -> impl Iterator<Item = (PipelineIndex, &ProductQuery)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.query().map(|q| (o.index, q)))
    }

    /// Iterates over failures.
    pub fn failures(&self) -> impl Iterator<Item = &PipelineFailure> {
        self.outcomes.iter().filter_map(PipelineOutcome::failure_info)
    }

    /// Returns the number of successful pipelines.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes().count()
    }

    /// Returns the number of failed pipelines.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// Returns true if any pipeline failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    /// Returns the success rate.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        self.success_count() as f64 / self.outcomes.len() as f64
    }

    /// Returns one line per pipeline, in index order.
    #[must_use]
    pub fn report_lines(&self) -> Vec<String> {
        self.outcomes.iter().map(PipelineOutcome::report_line).collect()
    }

    /// Returns every query result, or an [`AggregationError`] naming every
    /// failed pipeline.
    pub fn into_result(self) -> Result<Vec<(PipelineIndex, ProductQuery)>, AggregationError> {
        let total = self.outcomes.len();
        let mut successes = Vec::with_capacity(total);
        let mut failures = Vec::new();

        for outcome in self.outcomes {
            match outcome.result {
                Ok(query) => successes.push((outcome.index, query)),
                Err(failure) => failures.push(failure),
            }
        }

        if failures.is_empty() {
            Ok(successes)
        } else {
            Err(AggregationError::new(total, failures))
        }
    }

    /// Converts to a JSON summary.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "run_id": self.run_id.to_string(),
            "started_at": self.started_at.to_rfc3339(),
            "elapsed_ms": self.elapsed.as_secs_f64() * 1000.0,
            "total": self.len(),
            "succeeded": self.success_count(),
            "failed": self.failure_count(),
            "success_rate": self.success_rate(),
            "outcomes": self.outcomes.iter().map(PipelineOutcome::to_dict).collect::<Vec<_>>(),
        })
    }
}
