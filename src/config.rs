use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::matching::ScoringWeights;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct ShopperConfig {
    /// Completion provider used by the last extraction stage
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Map of provider name to provider configuration
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Extractors configuration
    #[serde(default)]
    pub extractors: ExtractorsConfig,
    /// Product matching configuration
    #[serde(default)]
    pub matching: MatchingConfig,
    /// Map of store name to store configuration
    #[serde(default = "default_stores")]
    pub stores: HashMap<String, StoreConfig>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for ShopperConfig {
    fn default() -> Self {
        ShopperConfig {
            default_provider: default_provider(),
            providers: HashMap::new(),
            extractors: ExtractorsConfig::default(),
            matching: MatchingConfig::default(),
            stores: default_stores(),
            timeout: default_timeout(),
        }
    }
}

/// Configuration for a completion provider
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Whether this provider is enabled
    pub enabled: bool,
    /// Model identifier (e.g., "gpt-4.1-mini", "claude-3-5-haiku-latest")
    pub model: String,
    /// Temperature for generation (0.0-1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// API key for authentication (can also be set via environment variable)
    pub api_key: Option<String>,
    /// Base URL for API endpoint (for custom or proxy endpoints)
    pub base_url: Option<String>,
}

/// Configuration for recipe extractors
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractorsConfig {
    /// Order in which the markup extractors are tried. The completion stage
    /// always runs last.
    #[serde(default = "default_extractors")]
    pub order: Vec<String>,
    /// Visible text sent to the completion provider is cut to this many chars
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,
}

impl Default for ExtractorsConfig {
    fn default() -> Self {
        ExtractorsConfig {
            order: default_extractors(),
            max_text_chars: default_max_text_chars(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingConfig {
    /// Shopper location passed to store searches (postcode or suburb)
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default)]
    pub weights: ScoringWeights,
    /// Ask the default provider for substitutes when nothing fits the profile
    #[serde(default)]
    pub substitutes: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        MatchingConfig {
            location: default_location(),
            weights: ScoringWeights::default(),
            substitutes: false,
        }
    }
}

/// Configuration for one store catalog
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Override for the catalog endpoint (proxies, tests)
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    /// Number of products requested per search
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            enabled: default_enabled(),
            base_url: None,
            api_key: None,
            page_size: default_page_size(),
        }
    }
}

// Default value functions
fn default_provider() -> String {
    "openai".to_string()
}

fn default_temperature() -> f32 {
    0.0
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_extractors() -> Vec<String> {
    vec![
        "json_ld".to_string(),
        "microdata".to_string(),
        "html_class".to_string(),
    ]
}

fn default_max_text_chars() -> usize {
    4000
}

fn default_location() -> String {
    "2000".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_page_size() -> u32 {
    10
}

fn default_stores() -> HashMap<String, StoreConfig> {
    ["woolworths", "coles", "iga"]
        .into_iter()
        .map(|name| (name.to_string(), StoreConfig::default()))
        .collect()
}

fn default_timeout() -> u64 {
    30
}

impl ShopperConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with SHOPPER__ prefix
    /// 2. shopper.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: SHOPPER__STORES__COLES__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Load configuration from file and environment variables, see
/// [`ShopperConfig::load`]
pub fn load_config() -> Result<ShopperConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("shopper").required(false))
        // Use double underscore for nested: SHOPPER__MATCHING__LOCATION
        .add_source(
            Environment::with_prefix("SHOPPER")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
