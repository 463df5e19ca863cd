use anyhow::Result;

use crate::cli::OutputFormat;
use crate::metrics::ProbeMetrics;
use crate::statistics::Statistics;

pub fn render(stats: &Statistics, format: OutputFormat, metrics: Option<&ProbeMetrics>) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(stats.to_string()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(stats)?),
        OutputFormat::Prometheus => metrics
            .ok_or_else(|| anyhow::anyhow!("Prometheus output requested but no metrics were collected"))?
            .render(),
    }
}
