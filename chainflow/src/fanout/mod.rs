//! Fan-out/fan-in of two-stage pipelines.

mod coordinator;
mod integration_tests;
mod report;

pub use coordinator::FanOutCoordinator;
pub use report::FanOutReport;
