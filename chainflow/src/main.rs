use std::path::PathBuf;
use std::process::exit;
use std::sync::Arc;

use anyhow::{Context, Result};
use chainflow::config::{FanOutConfig, LatencyRange};
use chainflow::demos::DemoRunner;
use chainflow::observability::{init_tracing, LogFormat, LoggingElapsedReporter};
use clap::Parser;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "chainflow")]
#[command(about = "Runs sequential, parallel and chained fan-out task demos")]
struct Args {
    /// Number of chained pipelines to launch
    #[arg(long, short = 'n')]
    pipelines: Option<usize>,

    /// Minimum stage one latency in milliseconds
    #[arg(long)]
    stage_one_min_ms: Option<u64>,

    /// Maximum stage one latency in milliseconds
    #[arg(long)]
    stage_one_max_ms: Option<u64>,

    /// Minimum stage two latency in milliseconds
    #[arg(long)]
    stage_two_min_ms: Option<u64>,

    /// Maximum stage two latency in milliseconds
    #[arg(long)]
    stage_two_max_ms: Option<u64>,

    /// JSON configuration file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Log format (text or json)
    #[arg(long, default_value = "text")]
    log_format: LogFormat,

    /// Enable debug logging
    #[arg(long)]
    verbose: bool,
}

impl Args {
    fn build_config(&self) -> Result<FanOutConfig> {
        let mut config = match &self.config {
            Some(path) => FanOutConfig::from_json_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => FanOutConfig::default(),
        };

        if let Some(pipelines) = self.pipelines {
            config.pipelines = pipelines;
        }
        config.simulators.stage_one = override_range(
            config.simulators.stage_one,
            self.stage_one_min_ms,
            self.stage_one_max_ms,
        );
        config.simulators.stage_two = override_range(
            config.simulators.stage_two,
            self.stage_two_min_ms,
            self.stage_two_max_ms,
        );

        config.validate()?;
        Ok(config)
    }
}

fn override_range(range: LatencyRange, min_ms: Option<u64>, max_ms: Option<u64>) -> LatencyRange {
    LatencyRange::new(min_ms.unwrap_or(range.min_ms), max_ms.unwrap_or(range.max_ms))
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.verbose, args.log_format);

    if let Err(e) = run(&args).await {
        error!("Error: {:#}", e);
        exit(1);
    }
}

async fn run(args: &Args) -> Result<()> {
    let config = args.build_config()?;
    info!(
        pipelines = config.pipelines,
        stage_one = ?config.simulators.stage_one,
        stage_two = ?config.simulators.stage_two,
        "Starting demos"
    );

    let demos = DemoRunner::new(&config, Arc::new(LoggingElapsedReporter))?;
    let report = demos.run_all(&mut std::io::stdout()).await?;

    if report.has_failures() {
        info!(failed = report.failure_count(), "Some pipelines failed");
    }
    Ok(())
}
