use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::info;

use crate::aggregator::aggregate;
use crate::config::ProbeConfig;
use crate::dispatcher::Dispatcher;
use crate::metrics::ProbeMetrics;
use crate::prober::http::HttpProber;
use crate::statistics::Statistics;
use crate::util::parse_target;

// Past this many results the channel stops growing and probes wait on the reader.
const MAX_RESULT_BUFFER: usize = 65_536;

/// One complete measurement: dispatch `config.count` probes, collect every
/// result and reduce them. Probe failures never make this fail; only an
/// invalid config or a client that cannot be built does.
pub async fn run(config: &ProbeConfig, metrics: Option<Arc<ProbeMetrics>>) -> Result<Statistics> {
    config.validate()?;

    let url = parse_target(&config.target)?;
    let prober = Arc::new(HttpProber::new(url, config.timeout_policy())?);
    let dispatcher = Dispatcher::new(config.concurrency)?;
    let n = config.count;

    info!(
        "probing {} with {} requests ({:?}, concurrency {})",
        prober.url(),
        n,
        prober.policy(),
        config.concurrency.map_or_else(|| "unbounded".to_string(), |c| c.to_string())
    );

    let capacity = usize::try_from(n).map_or(MAX_RESULT_BUFFER, |n| n.min(MAX_RESULT_BUFFER));
    let (tx, rx) = mpsc::channel(capacity);

    let started = Instant::now();
    dispatcher.dispatch(prober, n, tx, metrics.clone());
    let stats = aggregate(rx, n, started).await?;

    if let Some(metrics) = &metrics {
        metrics.record_run(&stats);
    }

    info!(
        "finished {} requests in {:?}: ok={}, bad={}, timeout={}",
        stats.count, stats.total_wall_time, stats.success_count, stats.bad_count, stats.timeout_count
    );
    Ok(stats)
}
