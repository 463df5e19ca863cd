use anyhow::Result;
use std::time::Duration;
use tokio::sync::mpsc::Receiver;
use tokio::time::Instant;
use tracing::trace;

use crate::prober::{ProbeOutcome, ProbeResult};
use crate::statistics::Statistics;

/// Running fold over probe results. Every update is commutative, so the
/// final value does not depend on the order results arrive in.
#[derive(Debug, Clone, Default)]
pub struct StatsAccumulator {
    count: u64,
    success_count: u64,
    bad_count: u64,
    timeout_count: u64,
    min: Option<Duration>,
    max: Duration,
    sum_nanos: u128,
}

impl StatsAccumulator {
    pub fn record(&mut self, result: &ProbeResult) {
        self.count += 1;
        match result.outcome {
            ProbeOutcome::Failure => self.bad_count += 1,
            // timed-out latencies are not representative, keep them out of min/max/mean
            ProbeOutcome::Timeout => self.timeout_count += 1,
            ProbeOutcome::Success => {
                self.success_count += 1;
                self.min = Some(self.min.map_or(result.elapsed, |m| m.min(result.elapsed)));
                self.max = self.max.max(result.elapsed);
                self.sum_nanos += result.elapsed.as_nanos();
            }
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn finish(&self, total_wall_time: Duration) -> Statistics {
        let mean_time = if self.success_count == 0 {
            Duration::ZERO
        } else {
            let mean = self.sum_nanos / u128::from(self.success_count);
            Duration::from_nanos(u64::try_from(mean).unwrap_or(u64::MAX))
        };

        Statistics {
            count: self.count,
            success_count: self.success_count,
            bad_count: self.bad_count,
            timeout_count: self.timeout_count,
            min_time: self.min.unwrap_or(Duration::ZERO),
            max_time: self.max,
            mean_time,
            total_wall_time,
        }
    }
}

/// Receives exactly `n` results and reduces them. `started` is the instant
/// taken just before the first probe was dispatched.
pub async fn aggregate(mut rx: Receiver<ProbeResult>, n: u64, started: Instant) -> Result<Statistics> {
    let mut acc = StatsAccumulator::default();
    while acc.count() < n {
        let result = rx.recv().await.ok_or_else(|| {
            anyhow::anyhow!("Result channel closed after {} of {} probe results", acc.count(), n)
        })?;
        trace!("received result {} of {}: {:?}", acc.count() + 1, n, result);
        acc.record(&result);
    }
    Ok(acc.finish(started.elapsed()))
}
