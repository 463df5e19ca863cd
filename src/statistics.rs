use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// Final report of one run.
///
/// Latency bounds and the mean cover successful probes only; all three are
/// zero when nothing succeeded. `total_wall_time` spans dispatch of the first
/// probe to receipt of the last result, so it is not the sum of latencies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub count: u64,
    pub success_count: u64,
    pub bad_count: u64,
    pub timeout_count: u64,
    #[serde(rename = "min_time_ms", serialize_with = "as_millis")]
    pub min_time: Duration,
    #[serde(rename = "max_time_ms", serialize_with = "as_millis")]
    pub max_time: Duration,
    #[serde(rename = "mean_time_ms", serialize_with = "as_millis")]
    pub mean_time: Duration,
    #[serde(rename = "total_wall_time_ms", serialize_with = "as_millis")]
    pub total_wall_time: Duration,
}

fn as_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_nanos() as f64 / 1_000_000.0)
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Result statistic:")?;
        writeln!(
            f,
            "Cnt: total={}, ok={}, bad={}, timeout={}",
            self.count, self.success_count, self.bad_count, self.timeout_count
        )?;
        write!(
            f,
            "Time: min={:?}, middle={:?}, max={:?}, full={:?}",
            self.min_time, self.mean_time, self.max_time, self.total_wall_time
        )
    }
}
