use crate::domain::ports::PageFetcher;
use crate::utils::error::{ExporterError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

pub const USER_AGENT: &str = "promcon_registration_exporter/0.1";

/// Fetches event pages over HTTP(S) with a bounded total request time.
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        tracing::debug!("Making request to: {}", url);
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);

        if !status.is_success() {
            return Err(ExporterError::UnexpectedStatusError {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}
