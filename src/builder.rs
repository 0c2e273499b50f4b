use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};

use crate::config::ShopperConfig;
use crate::dietary::DietaryProfile;
use crate::error::ShopperError;
use crate::extractors::RecipeExtractor;
use crate::fetchers::{PageFetcher, RequestFetcher};
use crate::ingredients::IngredientParser;
use crate::matching::ProductMatcher;
use crate::model::{RawPage, ShoppingList};
use crate::providers::{CompletionProvider, ProviderFactory};
use crate::stores::{StoreAdapter, StoreFactory};

/// Where the recipe comes from
#[derive(Debug, Clone)]
pub enum InputSource {
    /// Fetch the page from a URL
    Url(String),
    /// An already fetched page
    Page(RawPage),
}

/// Builder for turning a recipe page into a shopping list
#[derive(Default)]
pub struct ShoppingListBuilder {
    source: Option<InputSource>,
    location: Option<String>,
    profile: Option<DietaryProfile>,
    stores: Option<Vec<Arc<dyn StoreAdapter>>>,
    provider: Option<Arc<dyn CompletionProvider>>,
    fetcher: Option<Arc<dyn PageFetcher>>,
    config: Option<ShopperConfig>,
    timeout: Option<Duration>,
}

impl ShoppingListBuilder {
    /// Set the input source to a URL
    ///
    /// # Example
    /// ```
    /// use recipe_shopper::RecipeShopper;
    ///
    /// let builder = RecipeShopper::builder()
    ///     .url("https://example.com/recipe");
    /// ```
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.source = Some(InputSource::Url(url.into()));
        self
    }

    /// Use a page that was already fetched
    ///
    /// # Example
    /// ```
    /// use recipe_shopper::{RawPage, RecipeShopper};
    ///
    /// let page = RawPage::new("https://example.com/recipe", "<html></html>");
    /// let builder = RecipeShopper::builder().page(page);
    /// ```
    pub fn page(mut self, page: RawPage) -> Self {
        self.source = Some(InputSource::Page(page));
        self
    }

    /// Shopper location (postcode) passed to every store. Overrides
    /// `matching.location` from the configuration.
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Filter products against a dietary profile
    ///
    /// # Example
    /// ```
    /// use recipe_shopper::{Diet, DietaryProfile, RecipeShopper, Severity};
    ///
    /// let profile = DietaryProfile::with_diet(Diet::Vegetarian)
    ///     .allergen("peanuts", Severity::Strict);
    /// let builder = RecipeShopper::builder()
    ///     .url("https://example.com/recipe")
    ///     .profile(profile);
    /// ```
    pub fn profile(mut self, profile: DietaryProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Query these stores instead of the configured ones
    pub fn stores(mut self, stores: Vec<Arc<dyn StoreAdapter>>) -> Self {
        self.stores = Some(stores);
        self
    }

    /// Completion provider for the last extraction stage and for
    /// substitutes, instead of the configured default provider
    pub fn provider(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Fetcher used for `.url()` sources
    pub fn fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Use this configuration instead of loading `shopper.toml` and the
    /// environment
    pub fn config(mut self, config: ShopperConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a timeout for page fetches
    ///
    /// # Example
    /// ```
    /// use recipe_shopper::RecipeShopper;
    /// use std::time::Duration;
    ///
    /// let builder = RecipeShopper::builder()
    ///     .url("https://example.com/recipe")
    ///     .timeout(Duration::from_secs(30));
    /// ```
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Extract the recipe, parse its ingredients and match them to products
    ///
    /// # Errors
    /// Returns `ShopperError` if:
    /// - No input source was specified
    /// - The configuration cannot be loaded
    /// - The page cannot be fetched
    /// - No extraction stage finds a recipe
    ///
    /// Store failures do not fail the build; they are recorded on each item.
    ///
    /// # Example
    /// ```no_run
    /// # use recipe_shopper::RecipeShopper;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let list = RecipeShopper::builder()
    ///     .url("https://example.com/recipe")
    ///     .location("2000")
    ///     .build()
    ///     .await?;
    /// println!("Estimated total: ${:.2}", list.estimated_total);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn build(self) -> Result<ShoppingList, ShopperError> {
        let source = self.source.ok_or_else(|| {
            ShopperError::BuilderError(
                "No input source specified. Use .url() or .page()".to_string(),
            )
        })?;

        let config = match self.config {
            Some(config) => config,
            None => ShopperConfig::load()?,
        };

        let mut extractor = RecipeExtractor::from_config(&config);
        if let Some(provider) = &self.provider {
            extractor =
                extractor.with_completion(provider.clone(), config.extractors.max_text_chars);
        }

        let recipe = match source {
            InputSource::Page(page) => extractor.extract(&page).await?,
            InputSource::Url(url) => {
                let fetcher: Arc<dyn PageFetcher> = match self.fetcher {
                    Some(fetcher) => fetcher,
                    None => {
                        let timeout = self.timeout.unwrap_or_else(|| config.timeout());
                        let fetcher = RequestFetcher::new(Some(timeout)).map_err(|e| {
                            ShopperError::FetchFailed {
                                url: url.clone(),
                                message: e.to_string(),
                            }
                        })?;
                        Arc::new(fetcher)
                    }
                };
                extractor.fetch_and_extract(fetcher.as_ref(), &url).await?
            }
        };

        let ingredients = IngredientParser::new().parse_all(&recipe.ingredient_lines);
        let stores = self
            .stores
            .unwrap_or_else(|| StoreFactory::from_config(&config));

        let mut matcher = match self.location {
            Some(location) => ProductMatcher::new(location).with_weights(config.matching.weights),
            None => ProductMatcher::from_config(&config.matching),
        };
        if config.matching.substitutes {
            let provider = match self.provider {
                Some(provider) => Some(provider),
                None => match ProviderFactory::get_default_provider(&config) {
                    Ok(provider) => Some(provider),
                    Err(e) => {
                        debug!("Substitutes disabled: {}", e);
                        None
                    }
                },
            };
            if let Some(provider) = provider {
                matcher = matcher.with_substitutes(provider);
            }
        }
        info!(
            "Matching {} ingredients across {} stores near {}",
            ingredients.len(),
            stores.len(),
            matcher.location()
        );
        let items = matcher
            .match_all(&ingredients, &stores, self.profile.as_ref())
            .await;

        Ok(ShoppingList::new(recipe, items))
    }
}

/// Main entry point for the builder API
pub struct RecipeShopper;

impl RecipeShopper {
    /// Creates a new builder for shopping lists
    ///
    /// # Example
    /// ```
    /// use recipe_shopper::RecipeShopper;
    ///
    /// let builder = RecipeShopper::builder();
    /// ```
    pub fn builder() -> ShoppingListBuilder {
        ShoppingListBuilder::default()
    }
}
