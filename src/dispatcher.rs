use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::Sender;
use tracing::{debug, warn};

use crate::metrics::ProbeMetrics;
use crate::prober::ProbeResult;
use crate::prober::http::HttpProber;

/// Fans probes out onto the tokio runtime.
///
/// Without a concurrency limit every probe gets its own task. With a limit
/// of `k`, `k` workers drain a shared counter of `n` jobs so at most `k`
/// requests are in flight. Either way exactly `n` results are sent.
pub struct Dispatcher {
    concurrency: Option<usize>,
}

impl Dispatcher {
    pub fn new(concurrency: Option<usize>) -> Result<Self> {
        if concurrency == Some(0) {
            return Err(anyhow::anyhow!("Concurrency must be at least 1"));
        }
        Ok(Self { concurrency })
    }

    /// Spawns the probe tasks and returns immediately. `sink` should have
    /// room for all `n` results so no task waits on the reader.
    pub fn dispatch(
        &self,
        prober: Arc<HttpProber>,
        n: u64,
        sink: Sender<ProbeResult>,
        metrics: Option<Arc<ProbeMetrics>>,
    ) {
        match self.concurrency {
            None => {
                debug!("dispatching {} probes without a concurrency limit", n);
                for _ in 0..n {
                    let prober = prober.clone();
                    let sink = sink.clone();
                    let metrics = metrics.clone();
                    tokio::spawn(async move {
                        run_probe(&prober, &sink, metrics.as_deref()).await;
                    });
                }
            }
            Some(limit) => {
                let workers = usize::try_from(n).map_or(limit, |n| n.min(limit));
                debug!("dispatching {} probes over {} workers", n, workers);
                let remaining = Arc::new(AtomicU64::new(n));
                for _ in 0..workers {
                    let prober = prober.clone();
                    let sink = sink.clone();
                    let metrics = metrics.clone();
                    let remaining = remaining.clone();
                    tokio::spawn(async move {
                        while claim(&remaining) {
                            run_probe(&prober, &sink, metrics.as_deref()).await;
                        }
                    });
                }
            }
        }
    }
}

fn claim(remaining: &AtomicU64) -> bool {
    remaining
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |left| left.checked_sub(1))
        .is_ok()
}

async fn run_probe(prober: &HttpProber, sink: &Sender<ProbeResult>, metrics: Option<&ProbeMetrics>) {
    let result = prober.probe().await;
    if let Some(metrics) = metrics {
        metrics.observe(&result);
    }
    if sink.send(result).await.is_err() {
        warn!("result receiver dropped, discarding probe result for {}", prober.url());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prober::{ProbeOutcome, TimeoutPolicy};
    use crate::testing::{fixture_url, spawn_fixture};
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::Instant;

    async fn drain(mut rx: mpsc::Receiver<ProbeResult>) -> Vec<ProbeResult> {
        let mut out = Vec::new();
        while let Some(r) = rx.recv().await {
            out.push(r);
        }
        out
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        assert!(Dispatcher::new(Some(0)).is_err());
        assert!(Dispatcher::new(Some(1)).is_ok());
        assert!(Dispatcher::new(None).is_ok());
    }

    #[test]
    fn claim_hands_out_exactly_n_jobs() {
        let remaining = AtomicU64::new(3);
        assert!(claim(&remaining));
        assert!(claim(&remaining));
        assert!(claim(&remaining));
        assert!(!claim(&remaining));
        assert_eq!(remaining.load(Ordering::Acquire), 0);
    }

    #[tokio::test]
    async fn unbounded_dispatch_sends_one_result_per_probe() {
        let addr = spawn_fixture();
        let prober = Arc::new(HttpProber::new(fixture_url(addr, 200, 10), TimeoutPolicy::Disabled).unwrap());
        let (tx, rx) = mpsc::channel(8);

        Dispatcher::new(None).unwrap().dispatch(prober, 8, tx, None);

        // all senders are dropped once every task finishes, closing the channel
        let results = drain(rx).await;
        assert_eq!(results.len(), 8);
        assert!(results.iter().all(|r| r.outcome == ProbeOutcome::Success));
    }

    #[tokio::test]
    async fn bounded_dispatch_limits_in_flight_requests() {
        let addr = spawn_fixture();
        let prober = Arc::new(HttpProber::new(fixture_url(addr, 200, 100), TimeoutPolicy::Disabled).unwrap());
        let (tx, rx) = mpsc::channel(4);
        let metrics = Arc::new(ProbeMetrics::new().unwrap());

        let started = Instant::now();
        Dispatcher::new(Some(2)).unwrap().dispatch(prober, 4, tx, Some(metrics.clone()));
        let results = drain(rx).await;

        assert_eq!(results.len(), 4);
        // two waves of two 100ms requests
        assert!(started.elapsed() >= Duration::from_millis(200));
        assert!(metrics.render().unwrap().contains("probe_outcomes_total{outcome=\"success\"} 4"));
    }

    #[tokio::test]
    async fn limit_larger_than_count_still_sends_n() {
        let addr = spawn_fixture();
        let prober = Arc::new(HttpProber::new(fixture_url(addr, 404, 0), TimeoutPolicy::Disabled).unwrap());
        let (tx, rx) = mpsc::channel(3);

        Dispatcher::new(Some(64)).unwrap().dispatch(prober, 3, tx, None);

        let results = drain(rx).await;
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.outcome == ProbeOutcome::Failure));
    }
}
