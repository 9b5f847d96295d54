//! Error types for chainflow.
//!
//! Failures are layered the same way work is: a [`StageError`] belongs to
//! one stage of one pipeline, a [`PipelineFailure`] ties it to the pipeline
//! index, and an [`AggregationError`] is what the coordinator surfaces when
//! one or more pipelines failed at join time.

use crate::pipeline::PipelineIndex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// The main error type for chainflow operations.
#[derive(Debug, Error)]
pub enum ChainflowError {
    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// One or more pipelines of a fan-out failed.
    #[error("{0}")]
    Aggregation(#[from] AggregationError),

    /// A single pipeline failed.
    #[error("{0}")]
    Pipeline(#[from] PipelineFailure),

    /// A standalone stage call failed outside of a pipeline.
    #[error("{0}")]
    Stage(#[from] StageError),

    /// A spawned task panicked or was cancelled.
    #[error("Task join error: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// A pipeline index outside the valid range was requested.
    #[error("Invalid pipeline index: {0} (indices start at 1)")]
    InvalidIndex(u32),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which stage of a pipeline produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// The initial simulated call.
    StageOne,
    /// The dependent follow-up call.
    StageTwo,
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StageOne => write!(f, "stage one"),
            Self::StageTwo => write!(f, "stage two"),
        }
    }
}

/// Error raised when a stage fails to produce a result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{stage} failed: {message}")]
pub struct StageError {
    /// The stage that failed.
    pub stage: StageKind,
    /// The error message.
    pub message: String,
}

impl StageError {
    /// Creates a new stage error.
    #[must_use]
    pub fn new(stage: StageKind, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }

    /// Creates a stage one error.
    #[must_use]
    pub fn stage_one(message: impl Into<String>) -> Self {
        Self::new(StageKind::StageOne, message)
    }

    /// Creates a stage two error.
    #[must_use]
    pub fn stage_two(message: impl Into<String>) -> Self {
        Self::new(StageKind::StageTwo, message)
    }
}

/// Why a pipeline did not produce an outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureCause {
    /// One of the stages returned an error.
    #[error("{0}")]
    Stage(#[from] StageError),

    /// The task running the pipeline panicked or was aborted.
    #[error("task panicked: {0}")]
    Panicked(String),
}

/// Error raised when a pipeline fails as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Pipeline {index} failed: {cause}")]
pub struct PipelineFailure {
    /// The index of the failed pipeline.
    pub index: PipelineIndex,
    /// What went wrong.
    pub cause: FailureCause,
}

impl PipelineFailure {
    /// Creates a new pipeline failure.
    #[must_use]
    pub fn new(index: PipelineIndex, cause: impl Into<FailureCause>) -> Self {
        Self {
            index,
            cause: cause.into(),
        }
    }

    /// Returns the failed stage, if the failure came from a stage.
    #[must_use]
    pub fn stage(&self) -> Option<StageKind> {
        match &self.cause {
            FailureCause::Stage(err) => Some(err.stage),
            FailureCause::Panicked(_) => None,
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("index".to_string(), serde_json::json!(self.index.get()));
        map.insert("error".to_string(), serde_json::json!(self.cause.to_string()));
        if let Some(stage) = self.stage() {
            map.insert("stage".to_string(), serde_json::json!(stage));
        }
        map
    }
}

/// Error raised when the coordinator observes pipeline failures at join time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "{} of {total} pipelines failed: [{}]",
    failures.len(),
    failures.iter().map(|f| f.index.to_string()).collect::<Vec<_>>().join(", ")
)]
pub struct AggregationError {
    /// Number of pipelines launched.
    pub total: usize,
    /// Every failure, in index order.
    pub failures: Vec<PipelineFailure>,
}

impl AggregationError {
    /// Creates a new aggregation error.
    #[must_use]
    pub fn new(total: usize, failures: Vec<PipelineFailure>) -> Self {
        Self { total, failures }
    }

    /// Returns the indices of the failed pipelines.
    #[must_use]
    pub fn failed_indices(&self) -> Vec<PipelineIndex> {
        self.failures.iter().map(|f| f.index).collect()
    }
}
