use anyhow::Result;
use prometheus::{Encoder, Gauge, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

use crate::prober::ProbeResult;
use crate::statistics::Statistics;

const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Per-run Prometheus registry. Probe tasks observe into it concurrently;
/// the run summary gauges are set once after aggregation.
pub struct ProbeMetrics {
    registry: Registry,
    latency: HistogramVec,
    outcomes: IntCounterVec,
    wall_time: Gauge,
    mean_time: Gauge,
}

impl ProbeMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let latency = HistogramVec::new(
            HistogramOpts::new("probe_latency_seconds", "Probe latency in seconds by outcome")
                .buckets(LATENCY_BUCKETS.to_vec()),
            &["outcome"],
        )?;
        registry.register(Box::new(latency.clone()))?;

        let outcomes = IntCounterVec::new(
            Opts::new("probe_outcomes_total", "Total number of probes by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(outcomes.clone()))?;

        let wall_time = Gauge::new("probe_run_wall_seconds", "Wall-clock time of the whole run")?;
        registry.register(Box::new(wall_time.clone()))?;

        let mean_time = Gauge::new("probe_run_mean_seconds", "Mean latency of successful probes")?;
        registry.register(Box::new(mean_time.clone()))?;

        Ok(Self { registry, latency, outcomes, wall_time, mean_time })
    }

    pub fn observe(&self, result: &ProbeResult) {
        let label = result.outcome.as_str();
        self.latency
            .with_label_values(&[label])
            .observe(result.elapsed.as_secs_f64());
        self.outcomes.with_label_values(&[label]).inc();
    }

    pub fn record_run(&self, stats: &Statistics) {
        self.wall_time.set(stats.total_wall_time.as_secs_f64());
        self.mean_time.set(stats.mean_time.as_secs_f64());
    }

    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mf = self.registry.gather();
        let mut buf = Vec::new();
        encoder.encode(&mf, &mut buf)?;
        Ok(String::from_utf8(buf)?)
    }
}
