use std::time::Duration;

use async_trait::async_trait;

use tally_core::error::{Result, TallyError};
use tally_core::protocol::count::CountRecord;

use crate::config::UpstreamSection;

/// Source of fresh counts.
#[async_trait]
pub trait CountFetcher: Send + Sync {
    async fn fetch(&self) -> Result<CountRecord>;
}

/// Fetches from the counting service over HTTP.
///
/// Timeouts are short on purpose: with several counting replicas behind a
/// load balancer, a dead replica shows up on the next fetch instead of being
/// hidden behind a long wait or a sticky pooled connection.
pub struct HttpCountFetcher {
    client: reqwest::Client,
    url: String,
}

impl HttpCountFetcher {
    pub fn new(cfg: &UpstreamSection) -> Result<Self> {
        let timeout = Duration::from_millis(cfg.fetch_timeout_ms);
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_millis(cfg.pool_idle_timeout_ms))
            .user_agent(cfg.user_agent.clone())
            .build()
            .map_err(|e| TallyError::Internal(format!("http client build failed: {e}")))?;

        Ok(Self {
            client,
            url: cfg.url.clone(),
        })
    }
}

#[async_trait]
impl CountFetcher for HttpCountFetcher {
    async fn fetch(&self) -> Result<CountRecord> {
        let res = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(upstream_error)?;

        let body = res.bytes().await.map_err(upstream_error)?;
        CountRecord::from_json(&body)
    }
}

fn upstream_error(e: reqwest::Error) -> TallyError {
    if e.is_timeout() {
        TallyError::Upstream(format!("counting service timed out: {e}"))
    } else {
        TallyError::Upstream(e.to_string())
    }
}
