// Helpers for turning user input into something the prober can request.

use anyhow::Result;
use reqwest::Url;

pub fn parse_target(s: &str) -> Result<Url> {
    let s = s.trim();
    if s.is_empty() {
        return Err(anyhow::anyhow!("Target must not be empty"));
    }

    // Bare hosts like "example.com:8080" get a plain http scheme
    let with_scheme = if s.contains("://") {
        s.to_string()
    } else {
        format!("http://{}", s)
    };

    let url = Url::parse(&with_scheme)
        .map_err(|e| anyhow::anyhow!("Invalid target {}: {}", s, e))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(anyhow::anyhow!("Unsupported scheme {} in target {}. Only http and https are probed", other, s)),
    }
}
