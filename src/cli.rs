use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::{ProbeConfig, TimeoutMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Prometheus,
}

#[derive(Parser, Debug)]
#[command(name = "probe-burst")]
#[command(about = "Fire N concurrent GET requests at a URL and report availability and latency", long_about = None)]
pub struct CliArgs {
    /// URL to probe; a bare host gets http://
    #[arg(short, long, visible_alias = "domain", value_name = "URL")]
    target: Option<String>,

    /// Number of requests to send
    #[arg(short = 'n', long, visible_alias = "cnt")]
    count: Option<u64>,

    /// Request timeout in milliseconds, 0 disables it
    #[arg(long, value_name = "MS")]
    timeout: Option<u64>,

    /// enforced aborts slow requests, advisory lets them finish and counts them as timeouts
    #[arg(long, value_enum)]
    timeout_mode: Option<TimeoutMode>,

    /// Maximum requests in flight (default: all at once)
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// trace|debug|info|warn|error
    #[arg(long)]
    log_level: Option<String>,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// JSON config file providing defaults for the flags above
    #[arg(long, env = "PROBE_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl CliArgs {
    /// Loads the config file, if any, and lays explicit flags over it.
    pub async fn into_config(self) -> Result<(ProbeConfig, OutputFormat)> {
        let base = match &self.config {
            Some(path) => ProbeConfig::load_file(path).await?,
            None => ProbeConfig::default(),
        };
        let format = self.format;
        Ok((self.apply(base), format))
    }

    fn apply(self, mut config: ProbeConfig) -> ProbeConfig {
        if let Some(target) = self.target {
            config.target = target;
        }
        if let Some(count) = self.count {
            config.count = count;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_ms = timeout;
        }
        if let Some(mode) = self.timeout_mode {
            config.timeout_mode = mode;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = Some(concurrency);
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        config
    }
}
