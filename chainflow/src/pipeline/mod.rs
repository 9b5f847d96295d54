//! Two-stage pipelines.
//!
//! A pipeline runs a [`WorkSource`](crate::simulators::WorkSource) call and
//! feeds its result into a [`DependentWork`](crate::simulators::DependentWork)
//! call. Each pipeline is identified by a [`PipelineIndex`].

mod index;
mod outcome;
mod runner;

pub use index::PipelineIndex;
pub use outcome::PipelineOutcome;
pub use runner::{CallStyle, PipelineRunner};
