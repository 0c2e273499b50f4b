mod coles;
mod factory;
mod iga;
mod woolworths;

pub use coles::ColesCatalog;
pub use factory::StoreFactory;
pub use iga::IgaCatalog;
pub use woolworths::WoolworthsCatalog;

use async_trait::async_trait;
use log::debug;
use regex::Regex;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::sync::LazyLock;
use std::time::Duration;

use crate::error::StoreError;
use crate::model::{Product, Quantity};
use crate::units::UnitTable;

/// A retailer catalog with its own response shape. Implementors only
/// translate; matching and scoring never see `Native`.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// One product as the retailer returns it
    type Native: Send;

    /// Store name reported on every [`Product`]
    fn name(&self) -> &str;

    async fn search(&self, query: &str, location: &str) -> Result<Vec<Self::Native>, StoreError>;

    fn normalize(&self, native: Self::Native) -> Product;
}

/// Object-safe view of a store, what the matcher holds as `Arc<dyn StoreAdapter>`
#[async_trait]
pub trait StoreAdapter: Send + Sync {
    fn name(&self) -> &str;

    async fn search_products(&self, query: &str, location: &str)
        -> Result<Vec<Product>, StoreError>;
}

#[async_trait]
impl<C: Catalog> StoreAdapter for C {
    fn name(&self) -> &str {
        Catalog::name(self)
    }

    async fn search_products(
        &self,
        query: &str,
        location: &str,
    ) -> Result<Vec<Product>, StoreError> {
        let natives = self.search(query, location).await?;
        debug!("{} returned {} products for {:?}", Catalog::name(self), natives.len(), query);
        Ok(natives.into_iter().map(|n| self.normalize(n)).collect())
    }
}

static PACKAGE_SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)?)\s*([a-z]+(?:\s[a-z]+)?)$").expect("package size pattern")
});

static APPROX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"approx\.?").expect("approx pattern"));

/// Parse retailer size strings such as `"500g"`, `"1.25 L"` or `"approx. 1kg"`.
/// Anything else (`"6 x 330ml"`, `"each"`) is unsized.
pub fn parse_package_size(size: &str) -> Quantity {
    let lowered = size.to_lowercase();
    let cleaned = APPROX.replace_all(&lowered, "");
    let Some(caps) = PACKAGE_SIZE.captures(cleaned.trim()) else {
        return Quantity::unspecified();
    };
    let Ok(amount) = caps[1].parse::<f64>() else {
        return Quantity::unspecified();
    };

    let units = UnitTable::standard();
    match &caps[2] {
        "each" | "ea" | "pack" | "pk" => Quantity::count(amount),
        unit => Quantity::new(amount, units.standardize(unit)),
    }
}

/// Shared HTTP plumbing for catalog clients
#[derive(Debug, Clone)]
pub(crate) struct CatalogClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    page_size: u32,
}

impl CatalogClient {
    pub(crate) fn new(
        base_url: String,
        api_key: Option<String>,
        page_size: u32,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (compatible; RecipeShopper/1.0)")
            .build()?;
        Ok(CatalogClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            page_size,
        })
    }

    pub(crate) fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .header("Accept", "application/json")
    }

    pub(crate) fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub(crate) fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Send and decode, mapping non-success statuses to [`StoreError::Status`]
    /// and an elapsed client timeout to [`StoreError::Timeout`]
    pub(crate) async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, StoreError> {
        let response = request.send().await.map_err(StoreError::from_request)?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status(status.as_u16()));
        }
        let body = response.text().await.map_err(StoreError::from_request)?;
        serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))
    }
}
