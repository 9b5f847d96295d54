//! Logging setup and elapsed-time reporting.

mod elapsed;
mod subscriber;

pub use elapsed::{timed, ElapsedReporter, LoggingElapsedReporter, NoOpElapsedReporter};
pub use subscriber::{init_tracing, LogFormat};
