mod request;

pub use request::RequestFetcher;

use async_trait::async_trait;
use std::error::Error;

/// Retrieves the raw HTML of a page
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error + Send + Sync>>;
}
