//! Two-stage pipeline execution.

use super::{PipelineIndex, PipelineOutcome};
use crate::config::SimulatorConfig;
use crate::errors::PipelineFailure;
use crate::simulators::{DependentWork, DependentWorkSimulator, ProductQuery, WorkSimulator, WorkSource};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info_span, warn, Instrument};

/// How stage one is invoked.
///
/// Both styles produce the same result distribution; they differ only in
/// whether the call identifier is passed explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CallStyle {
    /// Zero-argument form using the default call identifier.
    Default,
    /// Explicit form passing the pipeline index as the call identifier.
    #[default]
    Explicit,
}

impl CallStyle {
    /// The style a fan-out uses for `index`: the first pipeline uses the
    /// default form, the rest pass their index.
    #[must_use]
    pub fn for_index(index: PipelineIndex) -> Self {
        if index == PipelineIndex::FIRST {
            Self::Default
        } else {
            Self::Explicit
        }
    }
}

/// Runs stage one, then stage two with stage one's result.
#[derive(Clone)]
pub struct PipelineRunner {
    source: Arc<dyn WorkSource>,
    dependent: Arc<dyn DependentWork>,
}

impl PipelineRunner {
    /// Creates a runner from the two stages.
    pub fn new(source: Arc<dyn WorkSource>, dependent: Arc<dyn DependentWork>) -> Self {
        Self { source, dependent }
    }

    /// Creates a runner backed by the random-latency simulators.
    #[must_use]
    pub fn simulated(config: &SimulatorConfig) -> Self {
        Self::new(
            Arc::new(WorkSimulator::new(config.stage_one)),
            Arc::new(DependentWorkSimulator::new(config.clone())),
        )
    }

    /// Runs one pipeline to completion.
    ///
    /// Stage two is only started once stage one has produced its result, and
    /// it receives exactly that result. If stage one fails, stage two never
    /// runs.
    pub async fn run(
        &self,
        index: PipelineIndex,
        style: CallStyle,
    ) -> Result<ProductQuery, PipelineFailure> {
        let call_id = index.get();

        let amount = match style {
            CallStyle::Default => self.source.fetch_default().await,
            CallStyle::Explicit => self.source.fetch(call_id).await,
        }
        .map_err(|e| PipelineFailure::new(index, e))?;

        debug!(%amount, "Stage one complete, starting stage two");

        self.dependent
            .query(call_id, amount)
            .await
            .map_err(|e| PipelineFailure::new(index, e))
    }

    /// Runs one pipeline inside its own span and records its duration.
    pub async fn run_outcome(&self, index: PipelineIndex, style: CallStyle) -> PipelineOutcome {
        let span = info_span!("pipeline", index = index.get(), ?style);

        async {
            let start = Instant::now();
            let result = self.run(index, style).await;
            let duration = start.elapsed();

            match result {
                Ok(query) => {
                    debug!(?duration, "Pipeline complete");
                    PipelineOutcome::success(index, query, duration)
                }
                Err(failure) => {
                    warn!(error = %failure, ?duration, "Pipeline failed");
                    PipelineOutcome::failure(failure, duration)
                }
            }
        }
        .instrument(span)
        .await
    }
}

impl std::fmt::Debug for PipelineRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineRunner").finish_non_exhaustive()
    }
}
