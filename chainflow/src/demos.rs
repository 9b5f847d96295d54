//! The four concurrency demos, run in sequence by the binary.
//!
//! 1. Sequential calls.
//! 2. Parallel calls without per-task arguments.
//! 3. Parallel calls, each with its own argument.
//! 4. Chained two-stage pipelines, fanned out and joined.

use crate::config::FanOutConfig;
use crate::errors::ChainflowError;
use crate::fanout::{FanOutCoordinator, FanOutReport};
use crate::observability::{timed, ElapsedReporter};
use crate::pipeline::PipelineRunner;
use crate::simulators::{Amount, WorkSimulator, WorkSource};
use std::io::Write;
use std::sync::Arc;
use tracing::info;

/// Number of calls made by each of the first three demos.
pub const DEMO_CALLS: u32 = 3;

/// Runs the demos against a shared configuration.
pub struct DemoRunner {
    source: Arc<dyn WorkSource>,
    coordinator: FanOutCoordinator,
    reporter: Arc<dyn ElapsedReporter>,
}

impl DemoRunner {
    /// Creates a runner using the random-latency simulators.
    pub fn new(
        config: &FanOutConfig,
        reporter: Arc<dyn ElapsedReporter>,
    ) -> Result<Self, ChainflowError> {
        Ok(Self {
            source: Arc::new(WorkSimulator::new(config.simulators.stage_one)),
            coordinator: FanOutCoordinator::from_config(config)?,
            reporter,
        })
    }

    /// Creates a runner from explicit parts.
    pub fn with_parts(
        source: Arc<dyn WorkSource>,
        runner: PipelineRunner,
        pipelines: usize,
        reporter: Arc<dyn ElapsedReporter>,
    ) -> Result<Self, ChainflowError> {
        Ok(Self {
            source,
            coordinator: FanOutCoordinator::new(runner, pipelines)?,
            reporter,
        })
    }

    /// Demo 1: one call after another.
    pub async fn sequential(&self) -> Result<Vec<Amount>, ChainflowError> {
        timed("sequential", self.reporter.as_ref(), async {
            let mut amounts = Vec::with_capacity(DEMO_CALLS as usize);
            for call_id in 1..=DEMO_CALLS {
                amounts.push(self.source.fetch(call_id).await?);
            }
            Ok::<_, ChainflowError>(amounts)
        })
        .await
    }

    /// Demo 2: concurrent calls, all using the default call form.
    pub async fn parallel(&self) -> Result<Vec<Amount>, ChainflowError> {
        timed("parallel", self.reporter.as_ref(), async {
            let handles: Vec<_> = (0..DEMO_CALLS)
                .map(|_| {
                    let source = self.source.clone();
                    tokio::spawn(async move { source.fetch_default().await })
                })
                .collect();

            let mut amounts = Vec::with_capacity(handles.len());
            for result in futures::future::join_all(handles).await {
                amounts.push(result??);
            }
            Ok::<_, ChainflowError>(amounts)
        })
        .await
    }

    /// Demo 3: concurrent calls, each given its own identifier.
    pub async fn parallel_with_args(&self) -> Result<Vec<Amount>, ChainflowError> {
        timed("parallel with arguments", self.reporter.as_ref(), async {
            let handles: Vec<_> = (1..=DEMO_CALLS)
                .map(|call_id| {
                    let source = self.source.clone();
                    tokio::spawn(async move { source.fetch(call_id).await })
                })
                .collect();

            let mut amounts = Vec::with_capacity(handles.len());
            for result in futures::future::join_all(handles).await {
                amounts.push(result??);
            }
            Ok::<_, ChainflowError>(amounts)
        })
        .await
    }

    /// Demo 4: chained pipelines, fanned out and joined.
    pub async fn chained(&self) -> FanOutReport {
        timed("chained pipelines", self.reporter.as_ref(), self.coordinator.run()).await
    }

    /// Runs all four demos in order, writing the demo 4 result lines to `out`.
    pub async fn run_all<W: Write>(&self, out: &mut W) -> Result<FanOutReport, ChainflowError> {
        info!("Demo 1: sequential calls");
        let amounts = self.sequential().await?;
        info!(?amounts, "Sequential calls complete");

        info!("Demo 2: parallel calls without arguments");
        let amounts = self.parallel().await?;
        info!(?amounts, "Parallel calls complete");

        info!("Demo 3: parallel calls with arguments");
        let amounts = self.parallel_with_args().await?;
        info!(?amounts, "Parallel calls with arguments complete");

        info!(pipelines = self.coordinator.pipelines(), "Demo 4: chained pipelines");
        let report = self.chained().await;
        for line in report.report_lines() {
            writeln!(out, "{line}")?;
        }
        out.flush()?;

        Ok(report)
    }
}

impl std::fmt::Debug for DemoRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DemoRunner")
            .field("coordinator", &self.coordinator)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{EchoDependentWork, IndexedWorkSource, RecordingElapsedReporter};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn runner(
        latency: Duration,
        source: IndexedWorkSource,
    ) -> (DemoRunner, Arc<IndexedWorkSource>, Arc<RecordingElapsedReporter>) {
        let source = Arc::new(source);
        let reporter = Arc::new(RecordingElapsedReporter::new());
        let pipelines = PipelineRunner::new(
            Arc::new(IndexedWorkSource::new(latency)),
            Arc::new(EchoDependentWork::new(latency)),
        );
        let demos = DemoRunner::with_parts(source.clone(), pipelines, 5, reporter.clone()).unwrap();
        (demos, source, reporter)
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_takes_sum_of_latencies() {
        let latency = Duration::from_millis(100);
        let (demos, source, reporter) = runner(latency, IndexedWorkSource::new(latency));

        let amounts = demos.sequential().await.unwrap();

        assert_eq!(amounts.len(), 3);
        assert_eq!(source.calls(), vec![1, 2, 3]);
        assert!(reporter.reports()[0].1 >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_parallel_uses_default_call_id() {
        let latency = Duration::from_millis(100);
        let (demos, source, reporter) = runner(latency, IndexedWorkSource::new(latency));

        let amounts = demos.parallel().await.unwrap();

        assert_eq!(amounts, vec![IndexedWorkSource::amount_for(1); 3]);
        assert_eq!(source.calls(), vec![1, 1, 1]);
        assert!(reporter.reports()[0].1 < Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_parallel_with_args_passes_each_id() {
        let latency = Duration::from_millis(100);
        let (demos, source, _) = runner(latency, IndexedWorkSource::new(latency));

        let amounts = demos.parallel_with_args().await.unwrap();

        let expected: Vec<Amount> = (1..=3).map(IndexedWorkSource::amount_for).collect();
        assert_eq!(amounts, expected);
        let mut calls = source.calls();
        calls.sort_unstable();
        assert_eq!(calls, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_sequential_propagates_stage_failure() {
        let (demos, _, _) = runner(Duration::ZERO, IndexedWorkSource::new(Duration::ZERO).failing_on(2));

        assert!(matches!(demos.sequential().await, Err(ChainflowError::Stage(_))));
    }

    #[tokio::test]
    async fn test_run_all_writes_result_lines() {
        let (demos, _, reporter) = runner(Duration::ZERO, IndexedWorkSource::new(Duration::ZERO));
        let mut out = Vec::new();

        let report = demos.run_all(&mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "Results from 1: 5 products cost more than $1.25.");
        assert_eq!(lines[4], "Results from 5: 9 products cost more than $5.25.");
        assert_eq!(report.success_count(), 5);
        assert_eq!(
            reporter.labels(),
            vec!["sequential", "parallel", "parallel with arguments", "chained pipelines"]
        );
    }
}
