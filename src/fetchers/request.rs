use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::error::Error;
use std::time::Duration;

use super::PageFetcher;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; RecipeShopperBot/1.0)";

pub struct RequestFetcher {
    client: Client,
}

impl RequestFetcher {
    pub fn new(timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let timeout = timeout.unwrap_or(Duration::from_secs(30));
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for RequestFetcher {
    async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
        debug!("Fetching {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("request failed with status: {status}").into());
        }
        let html = response.text().await?;
        Ok(html)
    }
}
