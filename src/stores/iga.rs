use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{parse_package_size, Catalog, CatalogClient};
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::model::{Product, Quantity};
use crate::units::UnitTable;

const DEFAULT_BASE_URL: &str = "https://api.metcashfood.com";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    products: Vec<IgaProduct>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IgaProduct {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub unit_price: Option<f64>,
    #[serde(default)]
    pub unit_type: Option<String>,
    #[serde(default)]
    pub in_stock: bool,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub allergens: Vec<String>,
}

pub struct IgaCatalog {
    client: CatalogClient,
}

impl IgaCatalog {
    pub fn new(config: &StoreConfig, timeout: Duration) -> Result<Self, StoreError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("IGA_API_KEY").ok());
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Ok(IgaCatalog {
            client: CatalogClient::new(base_url, api_key, config.page_size, timeout)?,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(base_url: String) -> Result<Self, StoreError> {
        let config = StoreConfig {
            base_url: Some(base_url),
            ..Default::default()
        };
        Self::new(&config, Duration::from_secs(10))
    }
}

#[async_trait]
impl Catalog for IgaCatalog {
    type Native = IgaProduct;

    fn name(&self) -> &str {
        "iga"
    }

    async fn search(&self, query: &str, location: &str) -> Result<Vec<IgaProduct>, StoreError> {
        let mut request = self.client.get("/v1/products").query(&[
            ("q", query.to_string()),
            ("postcode", location.to_string()),
            ("limit", self.client.page_size().to_string()),
        ]);
        if let Some(key) = self.client.api_key() {
            request = request.bearer_auth(key);
        }
        let response: SearchResponse = self.client.fetch_json(request).await?;
        Ok(response.products)
    }

    fn normalize(&self, native: IgaProduct) -> Product {
        // Loose items come without a size string, only a unit type ("kg", "each")
        let package_size = match (native.size.as_deref(), native.unit_type.as_deref()) {
            (Some(size), _) => parse_package_size(size),
            (None, Some("each")) => Quantity::count(1.0),
            (None, Some(unit)) if UnitTable::standard().lookup(unit).is_some() => {
                Quantity::new(1.0, UnitTable::standard().standardize(unit))
            }
            _ => Quantity::unspecified(),
        };

        Product {
            id: native.id,
            store: "iga".to_string(),
            name: native.name,
            brand: native.brand.unwrap_or_else(|| "IGA".to_string()),
            price: native.price,
            package_size,
            unit_price: native.unit_price,
            ingredients_text: native
                .ingredients
                .iter()
                .map(|i| i.trim().to_lowercase())
                .filter(|i| !i.is_empty())
                .collect(),
            allergen_warnings: native.allergens.iter().map(|a| a.trim().to_lowercase()).collect(),
            in_stock: native.in_stock,
        }
    }
}
