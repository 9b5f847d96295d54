//! Deterministic stages for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::errors::StageError;
use crate::observability::ElapsedReporter;
use crate::simulators::{Amount, DependentWork, ProductQuery, WorkSource};

/// A work source whose amount is derived from the call identifier.
///
/// Call `n` returns `$n.25` (wrapping below `$100.00`) after a fixed or
/// per-call latency. Selected calls can be made to fail or panic.
#[derive(Debug, Default)]
pub struct IndexedWorkSource {
    latency: Duration,
    overrides: HashMap<u32, Duration>,
    fail_on: HashSet<u32>,
    panic_on: HashSet<u32>,
    calls: Mutex<Vec<u32>>,
}

impl IndexedWorkSource {
    /// Creates a source with the given latency for every call.
    #[must_use]
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    /// The amount returned for `call_id`.
    #[must_use]
    pub const fn amount_for(call_id: u32) -> Amount {
        Amount::from_cents((call_id % 100) * 100 + 25)
    }

    /// Uses a different latency for `call_id`.
    #[must_use]
    pub fn with_latency_for(mut self, call_id: u32, latency: Duration) -> Self {
        self.overrides.insert(call_id, latency);
        self
    }

    /// Makes calls for `call_id` return an error.
    #[must_use]
    pub fn failing_on(mut self, call_id: u32) -> Self {
        self.fail_on.insert(call_id);
        self
    }

    /// Makes calls for `call_id` panic.
    #[must_use]
    pub fn panicking_on(mut self, call_id: u32) -> Self {
        self.panic_on.insert(call_id);
        self
    }

    /// Returns the call identifiers seen so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<u32> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl WorkSource for IndexedWorkSource {
    async fn fetch(&self, call_id: u32) -> Result<Amount, StageError> {
        self.calls.lock().push(call_id);
        let latency = self.overrides.get(&call_id).copied().unwrap_or(self.latency);
        tokio::time::sleep(latency).await;

        if self.panic_on.contains(&call_id) {
            panic!("injected panic for call {call_id}");
        }
        if self.fail_on.contains(&call_id) {
            return Err(StageError::stage_one(format!("injected failure for call {call_id}")));
        }
        Ok(Self::amount_for(call_id))
    }
}

/// A dependent stage that echoes its input and records every call.
///
/// The product count for call `n` is `n + 4`.
#[derive(Debug, Default)]
pub struct EchoDependentWork {
    latency: Duration,
    fail_on: HashSet<u32>,
    calls: Mutex<Vec<(u32, Amount)>>,
}

impl EchoDependentWork {
    /// Creates a stage with the given latency.
    #[must_use]
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    /// The product count returned for `call_id`.
    #[must_use]
    pub const fn count_for(call_id: u32) -> u32 {
        call_id + 4
    }

    /// Makes calls for `call_id` return an error.
    #[must_use]
    pub fn failing_on(mut self, call_id: u32) -> Self {
        self.fail_on.insert(call_id);
        self
    }

    /// Returns the `(call_id, amount)` pairs completed so far.
    #[must_use]
    pub fn calls(&self) -> Vec<(u32, Amount)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl DependentWork for EchoDependentWork {
    async fn query(&self, call_id: u32, amount: Amount) -> Result<ProductQuery, StageError> {
        tokio::time::sleep(self.latency).await;
        self.calls.lock().push((call_id, amount));

        if self.fail_on.contains(&call_id) {
            return Err(StageError::stage_two(format!("injected failure for call {call_id}")));
        }
        Ok(ProductQuery::new(call_id, Self::count_for(call_id), amount))
    }
}

/// An elapsed reporter that keeps every report.
#[derive(Debug, Default)]
pub struct RecordingElapsedReporter {
    reports: Mutex<Vec<(String, Duration)>>,
}

impl RecordingElapsedReporter {
    /// Creates an empty reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the reports received so far.
    #[must_use]
    pub fn reports(&self) -> Vec<(String, Duration)> {
        self.reports.lock().clone()
    }

    /// Returns the labels received so far.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.reports.lock().iter().map(|(label, _)| label.clone()).collect()
    }
}

impl ElapsedReporter for RecordingElapsedReporter {
    fn report(&self, label: &str, elapsed: Duration) {
        self.reports.lock().push((label.to_string(), elapsed));
    }
}
