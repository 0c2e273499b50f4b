use serde::{Deserialize, Serialize};

use crate::error::StoreQueryFailure;

/// A fetched page, the immutable input to extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPage {
    pub url: String,
    pub html: String,
}

impl RawPage {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        RawPage {
            url: url.into(),
            html: html.into(),
        }
    }
}

/// Which extraction stage produced a recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipeSource {
    /// Embedded JSON-LD metadata
    Structured,
    /// Inline microdata item properties
    Microdata,
    /// CSS class heuristics
    Heuristic,
    /// Text-completion fallback
    Ai,
}

impl RecipeSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipeSource::Structured => "structured",
            RecipeSource::Microdata => "microdata",
            RecipeSource::Heuristic => "heuristic",
            RecipeSource::Ai => "ai",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nutrition {
    pub calories: Option<String>,
    pub protein: Option<String>,
    pub carbohydrates: Option<String>,
    pub fat: Option<String>,
    pub fiber: Option<String>,
    pub sugar: Option<String>,
    pub sodium: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub value: f64,
    pub count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedRecipe {
    pub title: String,
    pub ingredient_lines: Vec<String>,
    pub instructions: Vec<String>,
    pub servings: Option<String>,
    pub prep_time: Option<String>,
    pub cook_time: Option<String>,
    pub total_time: Option<String>,
    pub image: Option<String>,
    pub source: RecipeSource,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub category: Vec<String>,
    #[serde(default)]
    pub cuisine: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub nutrition: Option<Nutrition>,
    #[serde(default)]
    pub rating: Option<Rating>,
}

impl ExtractedRecipe {
    /// An empty recipe attributed to `source`, to be filled in by a stage
    pub fn empty(source: RecipeSource) -> Self {
        ExtractedRecipe {
            title: String::new(),
            ingredient_lines: Vec::new(),
            instructions: Vec::new(),
            servings: None,
            prep_time: None,
            cook_time: None,
            total_time: None,
            image: None,
            source,
            description: None,
            author: None,
            category: Vec::new(),
            cuisine: Vec::new(),
            tags: Vec::new(),
            nutrition: None,
            rating: None,
        }
    }

    /// Drops blank lines and checks that both ingredients and instructions
    /// survived.
    pub fn validated(mut self) -> Result<Self, String> {
        self.ingredient_lines.retain(|line| !line.trim().is_empty());
        self.instructions.retain(|step| !step.trim().is_empty());

        if self.ingredient_lines.is_empty() {
            return Err(format!("{} recipe has no ingredients", self.source.as_str()));
        }
        if self.instructions.is_empty() {
            return Err(format!(
                "{} recipe has no instructions",
                self.source.as_str()
            ));
        }
        Ok(self)
    }
}

/// `amount: None` means "to taste" or unspecified, `unit: None` a bare count
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub amount: Option<f64>,
    pub unit: Option<String>,
}

impl Quantity {
    pub fn new(amount: f64, unit: impl Into<String>) -> Self {
        Quantity {
            amount: Some(amount),
            unit: Some(unit.into()),
        }
    }

    pub fn count(amount: f64) -> Self {
        Quantity {
            amount: Some(amount),
            unit: None,
        }
    }

    pub fn unspecified() -> Self {
        Quantity::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub original: String,
    pub name: String,
    pub quantity: Quantity,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub store: String,
    pub name: String,
    pub brand: String,
    pub price: f64,
    pub package_size: Quantity,
    pub unit_price: Option<f64>,
    pub ingredients_text: Vec<String>,
    pub allergen_warnings: Vec<String>,
    pub in_stock: bool,
}

/// Output of the matcher for one ingredient. `selected: None` means no
/// store returned a usable product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredMatch {
    pub ingredient: Ingredient,
    pub candidates: Vec<Product>,
    pub selected: Option<Product>,
    pub score: Option<f64>,
    pub warnings: Vec<String>,
    pub store_failures: Vec<StoreQueryFailure>,
    /// Alternatives suggested when no candidate fits the dietary profile
    #[serde(default)]
    pub substitutes: Vec<Substitute>,
}

impl ScoredMatch {
    pub fn is_matched(&self) -> bool {
        self.selected.is_some()
    }
}

/// A replacement ingredient, linked to a compliant product when a store
/// stocks one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Substitute {
    pub name: String,
    pub reason: Option<String>,
    pub product: Option<Product>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingList {
    pub recipe: ExtractedRecipe,
    pub items: Vec<ScoredMatch>,
    /// Names of ingredients no store could supply
    pub unmatched: Vec<String>,
    /// Sum of the selected products' prices, rounded to cents
    pub estimated_total: f64,
}

impl ShoppingList {
    pub fn new(recipe: ExtractedRecipe, items: Vec<ScoredMatch>) -> Self {
        let unmatched = items
            .iter()
            .filter(|item| !item.is_matched())
            .map(|item| item.ingredient.name.clone())
            .collect();
        let estimated_total = items
            .iter()
            .filter_map(|item| item.selected.as_ref())
            .map(|product| product.price)
            .sum::<f64>();
        ShoppingList {
            recipe,
            items,
            unmatched,
            estimated_total: (estimated_total * 100.0).round() / 100.0,
        }
    }
}
