use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;

use super::{ColesCatalog, IgaCatalog, StoreAdapter, WoolworthsCatalog};
use crate::config::{ShopperConfig, StoreConfig};
use crate::error::StoreError;

pub struct StoreFactory;

impl StoreFactory {
    /// Create a store adapter from configuration
    pub fn create(
        store_name: &str,
        config: &StoreConfig,
        timeout: Duration,
    ) -> Result<Arc<dyn StoreAdapter>, StoreError> {
        match store_name {
            "woolworths" => Ok(Arc::new(WoolworthsCatalog::new(config, timeout)?)),
            "coles" => Ok(Arc::new(ColesCatalog::new(config, timeout)?)),
            "iga" => Ok(Arc::new(IgaCatalog::new(config, timeout)?)),
            _ => Err(StoreError::Unsupported(store_name.to_string())),
        }
    }

    /// Every enabled store, in name order. Stores that fail to build are
    /// skipped with a warning.
    pub fn from_config(config: &ShopperConfig) -> Vec<Arc<dyn StoreAdapter>> {
        let mut names: Vec<&String> = config.stores.keys().collect();
        names.sort();

        names
            .into_iter()
            .filter_map(|name| {
                let store_config = &config.stores[name];
                if !store_config.enabled {
                    debug!("Store {} is disabled", name);
                    return None;
                }
                match Self::create(name, store_config, config.timeout()) {
                    Ok(store) => Some(store),
                    Err(e) => {
                        warn!("Skipping store {}: {}", name, e);
                        None
                    }
                }
            })
            .collect()
    }

    /// List all available store names
    pub fn available_stores() -> Vec<&'static str> {
        vec!["woolworths", "coles", "iga"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_create_known_stores() {
        for name in StoreFactory::available_stores() {
            let store = StoreFactory::create(name, &StoreConfig::default(), Duration::from_secs(1)).unwrap();
            assert_eq!(store.name(), name);
        }
    }

    #[test]
    fn test_create_unknown_store() {
        let result = StoreFactory::create("aldi", &StoreConfig::default(), Duration::from_secs(1));
        assert!(matches!(result, Err(StoreError::Unsupported(name)) if name == "aldi"));
    }

    #[test]
    fn test_from_config_skips_disabled_and_unknown() {
        let mut stores = HashMap::new();
        stores.insert("woolworths".to_string(), StoreConfig::default());
        stores.insert(
            "coles".to_string(),
            StoreConfig {
                enabled: false,
                ..Default::default()
            },
        );
        stores.insert("aldi".to_string(), StoreConfig::default());
        let config = ShopperConfig {
            stores,
            ..Default::default()
        };

        let adapters = StoreFactory::from_config(&config);
        let names: Vec<&str> = adapters.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["woolworths"]);
    }

    #[test]
    fn test_default_config_builds_all_stores() {
        let adapters = StoreFactory::from_config(&ShopperConfig::default());
        let names: Vec<&str> = adapters.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["coles", "iga", "woolworths"]);
    }
}
