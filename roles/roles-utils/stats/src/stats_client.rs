use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::stats_adapter::MetricRecord;

/// Anything that can produce a [`MetricRecord`] for an address.
///
/// The monitor only ever talks to this trait, so tests can control exactly
/// when and in which order responses arrive.
#[async_trait]
pub trait MetricSource: Send + Sync {
    async fn fetch(&self, address: &str) -> Result<MetricRecord, StatsClientError>;
}

/// HTTP client for the solo pool stats endpoint
/// Issues `GET <endpoint>?address=<address>` and decodes the JSON body
pub struct StatsClient {
    endpoint: Url,
    client: reqwest::Client,
}

impl StatsClient {
    /// Create a new stats client against a fixed base endpoint
    pub fn new(
        endpoint: &str,
        request_timeout: Duration,
        pool_idle_timeout: Duration,
    ) -> Result<Self, StatsClientError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| StatsClientError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;

        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .pool_idle_timeout(pool_idle_timeout)
            .pool_max_idle_per_host(1)
            .build()?;

        Ok(Self { endpoint, client })
    }

    /// Full request URL for one address
    pub fn request_url(&self, address: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("address", address);
        url
    }
}

#[async_trait]
impl MetricSource for StatsClient {
    async fn fetch(&self, address: &str) -> Result<MetricRecord, StatsClientError> {
        let url = self.request_url(address);
        debug!("Fetching solo stats from {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("Stats endpoint returned {} for {}", status, address);
            return Err(StatsClientError::Status(status));
        }

        response
            .json::<MetricRecord>()
            .await
            .map_err(|e| StatsClientError::Decode(e.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum StatsClientError {
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("{0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP error! status: {}", .0.as_u16())]
    Status(StatusCode),

    #[error("Invalid response body: {0}")]
    Decode(String),
}
