//! Testing utilities.
//!
//! Deterministic stand-ins for the simulators, for driving pipelines and
//! fan-outs in tests and benchmarks without random latencies.

pub mod mocks;

pub use mocks::{EchoDependentWork, IndexedWorkSource, RecordingElapsedReporter};
