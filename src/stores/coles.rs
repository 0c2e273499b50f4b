use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{parse_package_size, Catalog, CatalogClient};
use crate::config::StoreConfig;
use crate::dietary::LabelAnalyzer;
use crate::error::StoreError;
use crate::model::Product;

const DEFAULT_BASE_URL: &str = "https://api.coles.com.au";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    products: Vec<ColesProduct>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColesProduct {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub price: Option<Amount>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub unit_price: Option<Amount>,
    #[serde(default)]
    pub availability: Option<String>,
    /// Printed label text, "Ingredients: ... Contains: ... May contain: ..."
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Amount {
    pub value: f64,
    #[serde(default)]
    pub unit: Option<String>,
}

pub struct ColesCatalog {
    client: CatalogClient,
}

impl ColesCatalog {
    pub fn new(config: &StoreConfig, timeout: Duration) -> Result<Self, StoreError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("COLES_API_KEY").ok());
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Ok(ColesCatalog {
            client: CatalogClient::new(base_url, api_key, config.page_size, timeout)?,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(base_url: String, api_key: Option<String>) -> Result<Self, StoreError> {
        let config = StoreConfig {
            base_url: Some(base_url),
            api_key,
            ..Default::default()
        };
        Self::new(&config, Duration::from_secs(10))
    }
}

#[async_trait]
impl Catalog for ColesCatalog {
    type Native = ColesProduct;

    fn name(&self) -> &str {
        "coles"
    }

    async fn search(&self, query: &str, location: &str) -> Result<Vec<ColesProduct>, StoreError> {
        let mut request = self.client.get("/v1/products/search").query(&[
            ("query", query.to_string()),
            ("postcode", location.to_string()),
            ("limit", self.client.page_size().to_string()),
        ]);
        if let Some(key) = self.client.api_key() {
            request = request.header("x-api-key", key);
        }
        let response: SearchResponse = self.client.fetch_json(request).await?;
        Ok(response.products)
    }

    fn normalize(&self, native: ColesProduct) -> Product {
        let label = native
            .label
            .as_deref()
            .map(|text| LabelAnalyzer.analyze(text))
            .unwrap_or_default();

        Product {
            id: native.id,
            store: "coles".to_string(),
            name: native.name,
            brand: native.brand.unwrap_or_default(),
            price: native.price.as_ref().map(|p| p.value).unwrap_or(0.0),
            package_size: native
                .size
                .as_deref()
                .map(parse_package_size)
                .unwrap_or_default(),
            unit_price: native.unit_price.map(|u| u.value),
            ingredients_text: label.ingredients,
            allergen_warnings: label.allergen_warnings,
            in_stock: native.price.is_some()
                && native
                    .availability
                    .as_deref()
                    .map_or(true, |a| a.eq_ignore_ascii_case("IN_STOCK")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Quantity;
    use crate::stores::StoreAdapter;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_search_products() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/products/search")
            .match_query(Matcher::UrlEncoded("query".into(), "milk".into()))
            .match_header("x-api-key", "secret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "products": [
                        {
                            "id": "C-1",
                            "name": "Full Cream Milk",
                            "brand": "Coles",
                            "price": {"value": 3.1},
                            "size": "2L",
                            "unitPrice": {"value": 1.55, "unit": "1L"},
                            "availability": "IN_STOCK",
                            "label": "Ingredients: Milk. Contains: Milk."
                        },
                        {
                            "id": "C-2",
                            "name": "Lactose Free Milk",
                            "price": {"value": 4.0},
                            "size": "1L",
                            "availability": "OUT_OF_STOCK"
                        }
                    ]
                }"#,
            )
            .create_async()
            .await;

        let store = ColesCatalog::with_base_url(server.url(), Some("secret".to_string())).unwrap();
        let products = store.search_products("milk", "3000").await.unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].price, 3.1);
        assert_eq!(products[0].package_size, Quantity::new(2.0, "l"));
        assert_eq!(products[0].unit_price, Some(1.55));
        assert_eq!(products[0].ingredients_text, vec!["milk"]);
        assert!(products[0].in_stock);
        assert_eq!(products[1].brand, "");
        assert!(!products[1].in_stock);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/products/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let store = ColesCatalog::with_base_url(server.url(), None).unwrap();
        let err = store.search_products("milk", "3000").await.unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }
}
