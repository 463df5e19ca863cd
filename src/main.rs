mod aggregator;
mod cli;
mod config;
mod dispatcher;
mod engine;
mod metrics;
mod prober;
mod report;
mod statistics;
#[cfg(test)]
mod testing;
mod util;

use clap::Parser;
use cli::{CliArgs, OutputFormat};
use metrics::ProbeMetrics;

use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let args = CliArgs::parse();
    let (config, format) = args.into_config().await?;
    let log_level = config.get_tracing_level()?;

    // Init tracing with configured log level; stdout is reserved for the report
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()
                         .add_directive(format!("probe_burst={}", log_level.as_str().to_lowercase()).parse()?))
        .init();

    if let Err(e) = config.validate() {
        error!("invalid configuration: {:#}", e);
        eprintln!("Error: {:#}\n\nRun with --help for usage.", e);
        return Ok(ExitCode::FAILURE);
    }

    let metrics = match format {
        OutputFormat::Prometheus => Some(Arc::new(ProbeMetrics::new()?)),
        _ => None,
    };

    let stats = engine::run(&config, metrics.clone()).await?;
    println!("{}", report::render(&stats, format, metrics.as_deref())?);

    Ok(ExitCode::SUCCESS)
}
