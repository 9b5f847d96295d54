//! Simulated remote calls.
//!
//! A pipeline is built from two seams: a [`WorkSource`] producing an
//! [`Amount`], and a [`DependentWork`] that turns that amount into a
//! [`ProductQuery`]. The bundled simulators stand in for a web service and a
//! parameterized database query by sleeping for a random latency.

mod dependent;
mod work;

pub use dependent::DependentWorkSimulator;
pub use work::WorkSimulator;

use crate::errors::StageError;
use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Call identifier used by the zero-argument call form.
pub const DEFAULT_CALL_ID: u32 = 1;

/// Exclusive upper bound, in cents, of a simulated amount.
pub const MAX_AMOUNT_CENTS: u32 = 10_000;

/// A monetary quantity with two decimal places, held as whole cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(u32);

impl Amount {
    /// Creates an amount from whole cents.
    #[must_use]
    pub const fn from_cents(cents: u32) -> Self {
        Self(cents)
    }

    /// Returns the amount in whole cents.
    #[must_use]
    pub const fn cents(self) -> u32 {
        self.0
    }

    /// Returns the amount in dollars.
    #[must_use]
    pub fn dollars(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// Draws a random amount in `[0.00, 100.00)`.
    #[must_use]
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(0..MAX_AMOUNT_CENTS))
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Result of a dependent query: how many products cost more than a threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQuery {
    /// Identifier of the call that produced this result.
    pub call_id: u32,
    /// Number of matching products.
    pub count: u32,
    /// The amount the query was parameterized by.
    pub threshold: Amount,
}

impl ProductQuery {
    /// Creates a new query result.
    #[must_use]
    pub const fn new(call_id: u32, count: u32, threshold: Amount) -> Self {
        Self {
            call_id,
            count,
            threshold,
        }
    }
}

impl std::fmt::Display for ProductQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} products cost more than {}.", self.count, self.threshold)
    }
}

/// The first stage of a pipeline.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkSource: Send + Sync {
    /// Performs the call identified by `call_id`.
    ///
    /// The identifier is informational; it must not change the result
    /// distribution.
    async fn fetch(&self, call_id: u32) -> Result<Amount, StageError>;

    /// Performs the call with the default identifier.
    async fn fetch_default(&self) -> Result<Amount, StageError> {
        self.fetch(DEFAULT_CALL_ID).await
    }
}

/// The second stage of a pipeline, parameterized by the first stage's result.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DependentWork: Send + Sync {
    /// Runs the dependent call for `call_id` using `amount`.
    async fn query(&self, call_id: u32, amount: Amount) -> Result<ProductQuery, StageError>;
}
