//! Concurrent launch and join of N pipelines.

use super::FanOutReport;
use crate::config::FanOutConfig;
use crate::errors::{ChainflowError, FailureCause, PipelineFailure};
use crate::pipeline::{CallStyle, PipelineIndex, PipelineOutcome, PipelineRunner};
use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

/// Launches N pipelines concurrently and waits for all of them.
///
/// Every pipeline runs in its own tokio task and receives its index by
/// value, so no two pipelines can observe the same index. A failing
/// pipeline never cancels its siblings; [`run`](Self::run) returns only once
/// every task has terminated.
#[derive(Debug, Clone)]
pub struct FanOutCoordinator {
    runner: PipelineRunner,
    pipelines: usize,
}

impl FanOutCoordinator {
    /// Creates a coordinator launching `pipelines` pipelines.
    ///
    /// # Errors
    ///
    /// Returns [`ChainflowError::Config`] if `pipelines` is zero or does not
    /// fit a pipeline index.
    pub fn new(runner: PipelineRunner, pipelines: usize) -> Result<Self, ChainflowError> {
        if pipelines == 0 {
            return Err(ChainflowError::Config(
                "at least one pipeline is required".to_string(),
            ));
        }
        if u32::try_from(pipelines).is_err() {
            return Err(ChainflowError::Config(format!(
                "{pipelines} pipelines exceeds the maximum index"
            )));
        }
        Ok(Self { runner, pipelines })
    }

    /// Creates a coordinator backed by the random-latency simulators.
    pub fn from_config(config: &FanOutConfig) -> Result<Self, ChainflowError> {
        config.validate()?;
        Self::new(PipelineRunner::simulated(&config.simulators), config.pipelines)
    }

    /// Returns the number of pipelines launched per run.
    #[must_use]
    pub const fn pipelines(&self) -> usize {
        self.pipelines
    }

    /// Runs every pipeline and returns their outcomes in index order.
    pub async fn run(&self) -> FanOutReport {
        let run_id = Uuid::new_v4();
        let span = info_span!("fan_out", %run_id, pipelines = self.pipelines);
        self.run_inner(run_id).instrument(span).await
    }

    async fn run_inner(&self, run_id: Uuid) -> FanOutReport {
        let started_at = Utc::now();
        let start = Instant::now();
        info!("Launching pipelines");

        let mut handles: Vec<(PipelineIndex, JoinHandle<PipelineOutcome>)> =
            Vec::with_capacity(self.pipelines);

        for index in PipelineIndex::first_n(self.pipelines) {
            let runner = self.runner.clone();
            let style = CallStyle::for_index(index);
            let handle = tokio::spawn(
                async move { runner.run_outcome(index, style).await }.in_current_span(),
            );
            handles.push((index, handle));
        }

        // Join in slot order. Nothing is reported until every handle resolves.
        let mut outcomes = Vec::with_capacity(handles.len());
        for (index, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(join_error) => {
                    error!(index = index.get(), error = %join_error, "Pipeline task did not complete");
                    PipelineOutcome::failure(
                        PipelineFailure::new(index, FailureCause::Panicked(join_error.to_string())),
                        start.elapsed(),
                    )
                }
            };
            outcomes.push(outcome);
        }

        let report = FanOutReport::new(run_id, started_at, outcomes, start.elapsed());
        info!(
            succeeded = report.success_count(),
            failed = report.failure_count(),
            elapsed_ms = report.elapsed().as_secs_f64() * 1000.0,
            "All pipelines finished"
        );
        report
    }
}
