pub mod builder;
pub mod config;
pub mod dietary;
pub mod error;
pub mod extractors;
pub mod fetchers;
pub mod ingredients;
pub mod matching;
pub mod model;
pub mod providers;
pub mod stores;
pub mod units;

use std::sync::Arc;

// Re-export key types for convenience
pub use builder::{InputSource, RecipeShopper, ShoppingListBuilder};
pub use config::{load_config, ShopperConfig};
pub use dietary::{
    ComplianceChecker, ComplianceResult, Diet, DietaryProfile, Preference, Severity,
};
pub use error::{ConversionError, ParseError, ShopperError, StoreError, StoreQueryFailure};
pub use extractors::RecipeExtractor;
pub use fetchers::{PageFetcher, RequestFetcher};
pub use ingredients::IngredientParser;
pub use matching::{ProductMatcher, ScoringWeights};
pub use model::{
    ExtractedRecipe, Ingredient, Nutrition, Product, Quantity, Rating, RawPage, RecipeSource,
    ScoredMatch, ShoppingList, Substitute,
};
pub use providers::CompletionProvider;
pub use stores::{Catalog, StoreAdapter};

/// Extract a recipe from a fetched page using the markup stages only.
///
/// Use [`RecipeExtractor::from_config`] for the completion fallback.
///
/// # Example
/// ```
/// use recipe_shopper::{extract_recipe, RawPage};
///
/// # #[tokio::main]
/// # async fn main() {
/// let html = r#"<script type="application/ld+json">
///   {"@type": "Recipe", "name": "Toast",
///    "recipeIngredient": ["1 slice bread"], "recipeInstructions": "Toast it"}
/// </script>"#;
/// let recipe = extract_recipe(&RawPage::new("https://example.com/toast", html))
///     .await
///     .unwrap();
/// assert_eq!(recipe.title, "Toast");
/// # }
/// ```
pub async fn extract_recipe(page: &RawPage) -> Result<ExtractedRecipe, ShopperError> {
    RecipeExtractor::new().extract(page).await
}

/// Parse one free-text ingredient line
///
/// # Example
/// ```
/// use recipe_shopper::parse_ingredient;
///
/// let ingredient = parse_ingredient("1 1/2 cups flour").unwrap();
/// assert_eq!(ingredient.name, "flour");
/// assert_eq!(ingredient.quantity.amount, Some(1.5));
/// ```
pub fn parse_ingredient(text: &str) -> Result<Ingredient, ParseError> {
    IngredientParser::new().parse(text)
}

/// Convert an amount between two units through the standard conversion graph
pub fn convert_unit(quantity: f64, from: &str, to: &str) -> Result<f64, ConversionError> {
    units::convert(quantity, from, to, None)
}

/// Find the best product for one ingredient across `stores`
pub async fn match_products(
    ingredient: &Ingredient,
    stores: &[Arc<dyn StoreAdapter>],
    profile: Option<&DietaryProfile>,
    location: &str,
) -> ScoredMatch {
    ProductMatcher::new(location)
        .match_ingredient(ingredient, stores, profile)
        .await
}

/// Check one product against a dietary profile
pub fn check_compliance(product: &Product, profile: &DietaryProfile) -> ComplianceResult {
    ComplianceChecker::new().check(product, profile)
}
