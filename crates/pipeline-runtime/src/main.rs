//! # Store Events Pipeline Runtime
//!
//! One-shot entry point: configure telemetry, load configuration from the
//! environment, run the pipeline once and print the report as JSON.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (`SE_LOG_LEVEL`, `SE_JSON_LOGS`, ...)
//! 2. Load and validate `PipelineConfig` (`SE_*` variables)
//! 3. Wire broker, queues, producer and consumer
//! 4. Run once, shut down, report

use anyhow::{Context, Result};
use tracing::info;

use pipeline_runtime::{PipelineConfig, PipelineRuntime};
use store_telemetry::{init_telemetry, TelemetryConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry =
        init_telemetry(TelemetryConfig::from_env()).context("Failed to initialize telemetry")?;

    let config = PipelineConfig::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(
        max_messages = config.producer.max_messages,
        run_budget_ms = config.run_budget_ms,
        malformed_rate = config.effective_malformed_rate(),
        batch_size = config.consumer.batch_size,
        "Starting store events pipeline"
    );

    let runtime = PipelineRuntime::new(config)?;
    let result = runtime.run_once().await;
    runtime.shutdown();
    let report = result?;

    let json = serde_json::to_string_pretty(&report).context("Failed to encode report")?;
    info!(
        emitted = report.producer.total_messages,
        duration_ms = report.duration_ms,
        "Pipeline run complete"
    );
    println!("{json}");

    Ok(())
}
