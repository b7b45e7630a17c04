//! Typed HTTP client for the sysara daemon REST API.

use anyhow::{bail, Context, Result};
use reqwest::Client;

use crate::api::rest::DaemonHealth;
use crate::domain::types::{ProcessSnapshot, SystemSnapshot};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:9200";

pub struct SysaraClient {
    base_url: String,
    http: Client,
}

impl SysaraClient {
    pub fn new(base_url: &str) -> Result<Self> {
        // Stats requests block on the CPU sampling window.
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub async fn health(&self) -> Result<DaemonHealth> {
        self.get("/health").await
    }

    pub async fn stats(&self) -> Result<SystemSnapshot> {
        self.get("/api/v1/monitor/stats").await
    }

    pub async fn processes(&self) -> Result<ProcessSnapshot> {
        self.get("/api/v1/monitor/processes").await
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {}", url))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("{} returned {}: {}", url, status, body);
        }

        resp.json()
            .await
            .with_context(|| format!("parsing response from {}", url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash() {
        let client = SysaraClient::new("http://host:9200/").unwrap();
        assert_eq!(client.base_url, "http://host:9200");
    }
}
