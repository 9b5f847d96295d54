//! Elapsed-time measurement and reporting.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Trait for types that report how long a piece of work took.
pub trait ElapsedReporter: Send + Sync {
    /// Reports the elapsed time of the work named `label`.
    fn report(&self, label: &str, elapsed: Duration);
}

/// No-op elapsed reporter.
#[derive(Debug, Clone, Default)]
pub struct NoOpElapsedReporter;

impl ElapsedReporter for NoOpElapsedReporter {
    fn report(&self, _label: &str, _elapsed: Duration) {}
}

/// Logging-based elapsed reporter.
#[derive(Debug, Clone, Default)]
pub struct LoggingElapsedReporter;

impl ElapsedReporter for LoggingElapsedReporter {
    fn report(&self, label: &str, elapsed: Duration) {
        tracing::info!(
            label,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "Elapsed time: {:.2}s",
            elapsed.as_secs_f64()
        );
    }
}

/// Awaits `future`, reports how long it took, and returns its output.
pub async fn timed<F>(label: &str, reporter: &dyn ElapsedReporter, future: F) -> F::Output
where
    F: Future,
{
    let start = Instant::now();
    let output = future.await;
    reporter.report(label, start.elapsed());
    output
}
