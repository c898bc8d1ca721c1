use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// Retrieves the markup of the event page.
///
/// Implementations must treat any non-2xx response as an error.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String>;
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn year(&self) -> &str;
    fn location(&self) -> &str;
    fn request_timeout(&self) -> Duration;
}
