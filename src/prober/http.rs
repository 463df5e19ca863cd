use anyhow::Result;
use reqwest::{Client, Url};
use tokio::time::{Duration, Instant};
use tracing::debug;

use super::{ProbeOutcome, ProbeResult, TimeoutPolicy};

/// What the transport reported, before any policy is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportOutcome {
    Response(u16),
    TimedOut,
    Error,
}

pub fn classify(transport: TransportOutcome, elapsed: Duration, policy: TimeoutPolicy) -> ProbeOutcome {
    match transport {
        TransportOutcome::TimedOut => ProbeOutcome::Timeout,
        TransportOutcome::Error => ProbeOutcome::Failure,
        TransportOutcome::Response(status) if !(200..=299).contains(&status) => ProbeOutcome::Failure,
        TransportOutcome::Response(_) => match policy.advisory_threshold() {
            Some(threshold) if elapsed > threshold => ProbeOutcome::Timeout,
            _ => ProbeOutcome::Success,
        },
    }
}

/// Issues single GET requests against one target. The client is built once
/// and shared by every probe of a run.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
    url: Url,
    policy: TimeoutPolicy,
}

impl HttpProber {
    pub fn new(url: Url, policy: TimeoutPolicy) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(deadline) = policy.client_deadline() {
            builder = builder.timeout(deadline);
        }
        let client = builder.build()?;
        Ok(Self { client, url, policy })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn policy(&self) -> TimeoutPolicy {
        self.policy
    }

    /// Never fails: transport errors are folded into the returned outcome.
    pub async fn probe(&self) -> ProbeResult {
        let start = Instant::now();
        let sent = self.client.get(self.url.clone()).send().await;
        let elapsed = start.elapsed();

        let (transport, status) = match sent {
            Ok(resp) => {
                let status = resp.status().as_u16();
                // body is not read; dropping the response releases the connection
                drop(resp);
                (TransportOutcome::Response(status), Some(status))
            }
            Err(e) if e.is_timeout() => {
                debug!("http probe {} timed out after {:?}: {}", self.url, elapsed, e);
                (TransportOutcome::TimedOut, None)
            }
            Err(e) => {
                debug!("http probe {} failed after {:?}: {}", self.url, elapsed, e);
                (TransportOutcome::Error, None)
            }
        };

        let outcome = classify(transport, elapsed, self.policy);
        debug!(url = %self.url, ?status, outcome = outcome.as_str(), ?elapsed, "probe finished");

        let result = ProbeResult::new(outcome, elapsed);
        match status {
            Some(code) => result.with_status(code),
            None => result,
        }
    }
}
