//! Terminal result of one pipeline.

use super::PipelineIndex;
use crate::errors::PipelineFailure;
use crate::simulators::ProductQuery;
use std::collections::HashMap;
use std::time::Duration;

/// The outcome of one pipeline: its query result or the reason it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    /// The pipeline this outcome belongs to.
    pub index: PipelineIndex,
    /// The stage two result, or the failure that ended the pipeline.
    pub result: Result<ProductQuery, PipelineFailure>,
    /// Wall-clock time the pipeline took.
    pub duration: Duration,
}

impl PipelineOutcome {
    /// Creates a successful outcome.
    #[must_use]
    pub const fn success(index: PipelineIndex, query: ProductQuery, duration: Duration) -> Self {
        Self {
            index,
            result: Ok(query),
            duration,
        }
    }

    /// Creates a failed outcome.
    #[must_use]
    pub fn failure(failure: PipelineFailure, duration: Duration) -> Self {
        Self {
            index: failure.index,
            result: Err(failure),
            duration,
        }
    }

    /// Returns true if the pipeline succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Returns the query result if the pipeline succeeded.
    #[must_use]
    pub fn query(&self) -> Option<&ProductQuery> {
        self.result.as_ref().ok()
    }

    /// Returns the failure if the pipeline failed.
    #[must_use]
    pub fn failure_info(&self) -> Option<&PipelineFailure> {
        self.result.as_ref().err()
    }

    /// Formats the line printed for this pipeline.
    #[must_use]
    pub fn report_line(&self) -> String {
        match &self.result {
            Ok(query) => format!("Results from {}: {query}", self.index),
            Err(failure) => format!("Results from {}: FAILED ({})", self.index, failure.cause),
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("index".to_string(), serde_json::json!(self.index.get()));
        map.insert("success".to_string(), serde_json::json!(self.is_success()));
        map.insert(
            "duration_ms".to_string(),
            serde_json::json!(self.duration.as_secs_f64() * 1000.0),
        );
        match &self.result {
            Ok(query) => {
                map.insert("count".to_string(), serde_json::json!(query.count));
                map.insert("threshold".to_string(), serde_json::json!(query.threshold.to_string()));
            }
            Err(failure) => {
                map.insert("error".to_string(), serde_json::json!(failure.cause.to_string()));
            }
        }
        map
    }
}
