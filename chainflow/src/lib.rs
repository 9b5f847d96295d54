//! # Chainflow
//!
//! Chained fan-out/fan-in task pipelines on tokio.
//!
//! Chainflow launches N independent two-stage pipelines concurrently. Stage
//! two of pipeline *i* consumes the result of stage one of pipeline *i*, and
//! every outcome is collected at a join barrier:
//!
//! - **Simulators**: randomized-latency stand-ins for a remote call and a
//!   dependent query
//! - **Pipelines**: strict stage-one-then-stage-two sequencing per index
//! - **Fan-out**: one task per pipeline, each owning its own index
//! - **Failure isolation**: a failed pipeline is reported by index without
//!   disturbing its siblings
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chainflow::prelude::*;
//!
//! let coordinator = FanOutCoordinator::from_config(&FanOutConfig::default())?;
//! let report = coordinator.run().await;
//!
//! for line in report.report_lines() {
//!     println!("{line}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod demos;
pub mod errors;
pub mod fanout;
pub mod observability;
pub mod pipeline;
pub mod simulators;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{FanOutConfig, LatencyRange, SimulatorConfig};
    pub use crate::demos::DemoRunner;
    pub use crate::errors::{
        AggregationError, ChainflowError, FailureCause, PipelineFailure, StageError, StageKind,
    };
    pub use crate::fanout::{FanOutCoordinator, FanOutReport};
    pub use crate::observability::{
        ElapsedReporter, LoggingElapsedReporter, NoOpElapsedReporter,
    };
    pub use crate::pipeline::{CallStyle, PipelineIndex, PipelineOutcome, PipelineRunner};
    pub use crate::simulators::{
        Amount, DependentWork, DependentWorkSimulator, ProductQuery, WorkSimulator, WorkSource,
    };
}
