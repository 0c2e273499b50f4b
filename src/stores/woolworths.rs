use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{parse_package_size, Catalog, CatalogClient};
use crate::config::StoreConfig;
use crate::dietary::{split_ingredient_list, LabelAnalyzer};
use crate::error::StoreError;
use crate::model::Product;

const DEFAULT_BASE_URL: &str = "https://www.woolworths.com.au";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SearchResponse {
    #[serde(default)]
    products: Vec<WoolworthsProduct>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WoolworthsProduct {
    pub stockcode: u64,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub package_size: Option<String>,
    #[serde(default)]
    pub cup_price: Option<f64>,
    #[serde(default)]
    pub cup_measure: Option<String>,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default)]
    pub additional_attributes: Option<AdditionalAttributes>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdditionalAttributes {
    #[serde(default)]
    pub ingredients: Option<String>,
    #[serde(default)]
    pub allergystatement: Option<String>,
}

pub struct WoolworthsCatalog {
    client: CatalogClient,
}

impl WoolworthsCatalog {
    pub fn new(config: &StoreConfig, timeout: Duration) -> Result<Self, StoreError> {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Ok(WoolworthsCatalog {
            client: CatalogClient::new(base_url, config.api_key.clone(), config.page_size, timeout)?,
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
impl Catalog for WoolworthsCatalog {
    type Native = WoolworthsProduct;

    fn name(&self) -> &str {
        "woolworths"
    }

    async fn search(&self, query: &str, location: &str) -> Result<Vec<WoolworthsProduct>, StoreError> {
        let request = self.client.get("/apis/ui/Search/products").query(&[
            ("searchTerm", query.to_string()),
            ("postcode", location.to_string()),
            ("pageSize", self.client.page_size().to_string()),
        ]);
        let response: SearchResponse = self.client.fetch_json(request).await?;
        Ok(response.products)
    }

    fn normalize(&self, native: WoolworthsProduct) -> Product {
        let attributes = native.additional_attributes.unwrap_or_default();
        let mut ingredients_text = attributes
            .ingredients
            .as_deref()
            .map(split_ingredient_list)
            .unwrap_or_default();

        let statement = attributes
            .allergystatement
            .map(|s| LabelAnalyzer.analyze(&s))
            .unwrap_or_default();
        for item in statement.ingredients {
            if !ingredients_text.contains(&item) {
                ingredients_text.push(item);
            }
        }

        // CupPrice is quoted per CupMeasure (e.g. "100G"), not per package unit
        let unit_price = native.cup_price.filter(|_| native.cup_measure.is_some());

        Product {
            id: native.stockcode.to_string(),
            store: "woolworths".to_string(),
            name: native.name,
            brand: native.brand.unwrap_or_default(),
            price: native.price.unwrap_or(0.0),
            package_size: native
                .package_size
                .as_deref()
                .map(parse_package_size)
                .unwrap_or_default(),
            unit_price,
            ingredients_text,
            allergen_warnings: statement.allergen_warnings,
            in_stock: native.is_available && native.price.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Quantity;
    use crate::stores::StoreAdapter;
    use mockito::{Matcher, Server};

    const RESPONSE: &str = r#"{
        "Products": [
            {
                "Stockcode": 123456,
                "Name": "Plain Flour",
                "Brand": "Woolworths",
                "Price": 1.5,
                "PackageSize": "1kg",
                "CupPrice": 0.15,
                "CupMeasure": "100G",
                "IsAvailable": true,
                "AdditionalAttributes": {
                    "ingredients": "Wheat Flour, Thiamin",
                    "allergystatement": "Contains: Gluten. May contain: Soy."
                }
            },
            {
                "Stockcode": 99,
                "Name": "Discontinued Flour",
                "IsAvailable": false
            }
        ]
    }"#;

    #[tokio::test]
    async fn test_search_products() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/apis/ui/Search/products")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("searchTerm".into(), "flour".into()),
                Matcher::UrlEncoded("postcode".into(), "2000".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(RESPONSE)
            .create_async()
            .await;

        let store = WoolworthsCatalog::with_base_url(server.url()).unwrap();
        let products = store.search_products("flour", "2000").await.unwrap();

        assert_eq!(products.len(), 2);
        let flour = &products[0];
        assert_eq!(flour.id, "123456");
        assert_eq!(flour.store, "woolworths");
        assert_eq!(flour.package_size, Quantity::new(1.0, "kg"));
        assert_eq!(flour.unit_price, Some(0.15));
        assert_eq!(flour.ingredients_text, vec!["wheat flour", "thiamin", "gluten"]);
        assert_eq!(flour.allergen_warnings, vec!["soy"]);
        assert!(flour.in_stock);

        let missing = &products[1];
        assert!(!missing.in_stock);
        assert!(missing.ingredients_text.is_empty());
        assert_eq!(missing.package_size, Quantity::unspecified());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/apis/ui/Search/products")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let store = WoolworthsCatalog::with_base_url(server.url()).unwrap();
        let err = store.search_products("flour", "2000").await.unwrap_err();
        assert!(matches!(err, StoreError::Status(503)));
    }

    #[tokio::test]
    async fn test_timeout() {
        // accepts connections into the backlog but never answers
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let config = StoreConfig {
            base_url: Some(format!("http://{}", listener.local_addr().unwrap())),
            ..Default::default()
        };

        let store = WoolworthsCatalog::new(&config, Duration::from_millis(200)).unwrap();
        let err = store.search_products("flour", "2000").await.unwrap_err();
        assert!(matches!(err, StoreError::Timeout), "{err:?}");
        drop(listener);
    }
}
