use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod http;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProbeOutcome {
    Success,
    /// Non-2xx status or a transport error other than a deadline.
    Failure,
    /// Transport deadline hit, or elapsed over the advisory threshold.
    Timeout,
}

impl ProbeOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeOutcome::Success => "success",
            ProbeOutcome::Failure => "failure",
            ProbeOutcome::Timeout => "timeout",
        }
    }
}

/// Outcome of one GET against the target. `elapsed` is always set,
/// whatever the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    pub outcome: ProbeOutcome,
    pub elapsed: Duration,
    pub status: Option<u16>,
}

impl ProbeResult {
    pub fn new(outcome: ProbeOutcome, elapsed: Duration) -> Self {
        Self { outcome, elapsed, status: None }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// How request duration limits are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutPolicy {
    /// No deadline and no post-hoc check.
    Disabled,
    /// The HTTP client aborts requests after this deadline.
    Enforced(Duration),
    /// Requests run to completion; completed ones slower than this are timeouts.
    Advisory(Duration),
}

impl TimeoutPolicy {
    pub fn client_deadline(&self) -> Option<Duration> {
        match self {
            TimeoutPolicy::Enforced(d) => Some(*d),
            _ => None,
        }
    }

    pub fn advisory_threshold(&self) -> Option<Duration> {
        match self {
            TimeoutPolicy::Advisory(d) => Some(*d),
            _ => None,
        }
    }
}
