use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;

use crate::prober::TimeoutPolicy;
use crate::util::parse_target;

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TimeoutMode {
    /// The HTTP client aborts requests at the deadline.
    #[default]
    Enforced,
    /// Requests run to completion and are judged against the threshold afterwards.
    Advisory,
}

/// Everything one run needs. Built once from the config file and CLI flags,
/// then handed to the engine as an immutable value.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ProbeConfig {
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub count: u64,
    /// 0 disables timeout handling in either mode.
    #[serde(default)]
    pub timeout_ms: u64,
    #[serde(default)]
    pub timeout_mode: TimeoutMode,
    /// Worker pool size. `None` spawns one task per probe.
    #[serde(default)]
    pub concurrency: Option<usize>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            target: String::new(),
            count: 0,
            timeout_ms: 0,
            timeout_mode: TimeoutMode::default(),
            concurrency: None,
            log_level: default_log_level(),
        }
    }
}

impl ProbeConfig {
    pub async fn load_file(file_path: &Path) -> Result<ProbeConfig> {
        if !file_path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", file_path.display()));
        }

        let content = fs::read_to_string(file_path).await?;
        let config: ProbeConfig = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", file_path.display()))?;
        Ok(config)
    }

    /// Get the log level as a tracing::Level
    pub fn get_tracing_level(&self) -> Result<tracing::Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(tracing::Level::TRACE),
            "debug" => Ok(tracing::Level::DEBUG),
            "info" => Ok(tracing::Level::INFO),
            "warn" | "warning" => Ok(tracing::Level::WARN),
            "error" => Ok(tracing::Level::ERROR),
            _ => Err(anyhow::anyhow!("Invalid log level: {}. Valid levels are: trace, debug, info, warn, error", self.log_level))
        }
    }

    /// Validate the log level is one of the supported values
    pub fn validate_log_level(&self) -> Result<()> {
        self.get_tracing_level().map(|_| ())
    }

    /// Rejects anything the engine must never see: an empty or unusable
    /// target, a zero count, an empty worker pool.
    pub fn validate(&self) -> Result<()> {
        if self.target.trim().is_empty() {
            return Err(anyhow::anyhow!("A target is required (--target)"));
        }
        parse_target(&self.target)?;
        if self.count == 0 {
            return Err(anyhow::anyhow!("Count must be a positive number of requests (--count)"));
        }
        if self.concurrency == Some(0) {
            return Err(anyhow::anyhow!("Concurrency must be at least 1 when set"));
        }
        self.validate_log_level()
    }

    pub fn timeout_policy(&self) -> TimeoutPolicy {
        if self.timeout_ms == 0 {
            return TimeoutPolicy::Disabled;
        }
        let limit = Duration::from_millis(self.timeout_ms);
        match self.timeout_mode {
            TimeoutMode::Enforced => TimeoutPolicy::Enforced(limit),
            TimeoutMode::Advisory => TimeoutPolicy::Advisory(limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ProbeConfig {
        ProbeConfig {
            target: "http://localhost:8080".to_string(),
            count: 10,
            ..ProbeConfig::default()
        }
    }

    #[test]
    fn validate_accepts_minimal_config() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_target_and_zero_count() {
        let no_target = ProbeConfig { target: "  ".to_string(), ..valid() };
        assert!(no_target.validate().is_err());

        let no_count = ProbeConfig { count: 0, ..valid() };
        assert!(no_count.validate().is_err());

        let no_workers = ProbeConfig { concurrency: Some(0), ..valid() };
        assert!(no_workers.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_log_level() {
        let cfg = ProbeConfig { log_level: "verbose".to_string(), ..valid() };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("Invalid log level"));
    }

    #[test]
    fn log_levels_are_case_insensitive() {
        let cfg = ProbeConfig { log_level: "WARNING".to_string(), ..valid() };
        assert_eq!(cfg.get_tracing_level().unwrap(), tracing::Level::WARN);
    }

    #[test]
    fn timeout_policy_follows_mode_and_zero_disables() {
        let enforced = ProbeConfig { timeout_ms: 250, ..valid() };
        assert_eq!(enforced.timeout_policy(), TimeoutPolicy::Enforced(Duration::from_millis(250)));

        let advisory = ProbeConfig { timeout_ms: 250, timeout_mode: TimeoutMode::Advisory, ..valid() };
        assert_eq!(advisory.timeout_policy(), TimeoutPolicy::Advisory(Duration::from_millis(250)));

        let off = ProbeConfig { timeout_ms: 0, timeout_mode: TimeoutMode::Advisory, ..valid() };
        assert_eq!(off.timeout_policy(), TimeoutPolicy::Disabled);
    }

    #[test]
    fn deserializes_with_defaults() {
        let cfg: ProbeConfig = serde_json::from_str(
            r#"{ "target": "https://example.com", "count": 5, "timeout_mode": "advisory" }"#,
        )
        .unwrap();
        assert_eq!(cfg.count, 5);
        assert_eq!(cfg.timeout_ms, 0);
        assert_eq!(cfg.timeout_mode, TimeoutMode::Advisory);
        assert_eq!(cfg.concurrency, None);
        assert_eq!(cfg.log_level, "info");
    }

    #[tokio::test]
    async fn load_file_reports_missing_path() {
        let err = ProbeConfig::load_file(Path::new("/nonexistent/probe.json")).await.unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[tokio::test]
    async fn load_file_reads_json() {
        let path = std::env::temp_dir().join(format!("probe-burst-config-{}.json", std::process::id()));
        fs::write(&path, r#"{ "target": "example.com", "count": 3, "concurrency": 2 }"#)
            .await
            .unwrap();

        let cfg = ProbeConfig::load_file(&path).await.unwrap();
        fs::remove_file(&path).await.unwrap();

        assert_eq!(cfg.target, "example.com");
        assert_eq!(cfg.concurrency, Some(2));
        assert!(cfg.validate().is_ok());
    }
}
