mod scoring;
mod substitutes;

pub use scoring::{compare_scores, ScoringWeights};
pub use substitutes::{MAX_SUBSTITUTES, SUBSTITUTE_PROMPT};

use futures_util::future::join_all;
use log::{debug, info, warn};
use std::error::Error;
use std::sync::Arc;

use crate::config::MatchingConfig;
use crate::dietary::{ComplianceChecker, DietaryProfile};
use crate::error::StoreQueryFailure;
use crate::model::{Ingredient, Product, Quantity, ScoredMatch, Substitute};
use crate::providers::CompletionProvider;
use crate::stores::StoreAdapter;
use substitutes::{parse_suggestions, substitute_prompt};

pub const NO_COMPLIANT_PRODUCTS: &str = "No products match dietary requirements";

/// Finds the best product for an ingredient across several stores
#[derive(Clone)]
pub struct ProductMatcher {
    location: String,
    weights: ScoringWeights,
    checker: ComplianceChecker,
    substitutes: Option<Arc<dyn CompletionProvider>>,
}

impl ProductMatcher {
    pub fn new(location: impl Into<String>) -> Self {
        ProductMatcher {
            location: location.into(),
            weights: ScoringWeights::default(),
            checker: ComplianceChecker::new(),
            substitutes: None,
        }
    }

    pub fn from_config(config: &MatchingConfig) -> Self {
        Self::new(config.location.clone()).with_weights(config.weights)
    }

    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Ask `provider` for substitutes whenever no candidate fits the profile
    pub fn with_substitutes(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.substitutes = Some(provider);
        self
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub async fn match_ingredient(
        &self,
        ingredient: &Ingredient,
        stores: &[Arc<dyn StoreAdapter>],
        profile: Option<&DietaryProfile>,
    ) -> ScoredMatch {
        let (products, store_failures) = self.gather(&ingredient.name, stores).await;
        let mut warnings = Vec::new();
        let mut unmet_profile = None;

        let candidates = match profile {
            Some(profile) => {
                let (safe, unsafe_): (Vec<Product>, Vec<Product>) = products
                    .into_iter()
                    .partition(|p| self.checker.check(p, profile).safe);
                if safe.is_empty() && !unsafe_.is_empty() {
                    warn!(
                        "No compliant product for {:?}, keeping all {} candidates",
                        ingredient.name,
                        unsafe_.len()
                    );
                    warnings.push(NO_COMPLIANT_PRODUCTS.to_string());
                    unmet_profile = Some(profile);
                    unsafe_
                } else {
                    safe
                }
            }
            None => products,
        };

        let substitutes = match (unmet_profile, &self.substitutes) {
            (Some(profile), Some(_)) => self
                .suggest_substitutes(ingredient, stores, profile, &candidates)
                .await
                .unwrap_or_else(|e| {
                    warn!("No substitutes for {:?}: {}", ingredient.name, e);
                    Vec::new()
                }),
            _ => Vec::new(),
        };

        let scored = self.rank(&ingredient.quantity, candidates);
        let score = scored.first().and_then(|(score, _)| *score);
        let candidates: Vec<Product> = scored.into_iter().map(|(_, p)| p).collect();
        let selected = candidates.first().cloned();

        if let (Some(product), Some(profile)) = (&selected, profile) {
            for warning in self.checker.check(product, profile).warnings {
                if !warnings.contains(&warning) {
                    warnings.push(warning);
                }
            }
        }

        match &selected {
            Some(product) => info!(
                "Matched {:?} to {} ({}) at ${:.2}",
                ingredient.name, product.name, product.store, product.price
            ),
            None => info!("No product found for {:?}", ingredient.name),
        }

        ScoredMatch {
            ingredient: ingredient.clone(),
            candidates,
            selected,
            score,
            warnings,
            store_failures,
            substitutes,
        }
    }

    /// Match every ingredient concurrently, results in input order
    pub async fn match_all(
        &self,
        ingredients: &[Ingredient],
        stores: &[Arc<dyn StoreAdapter>],
        profile: Option<&DietaryProfile>,
    ) -> Vec<ScoredMatch> {
        join_all(
            ingredients
                .iter()
                .map(|ingredient| self.match_ingredient(ingredient, stores, profile)),
        )
        .await
    }

    /// Ask the completion provider for replacements of `ingredient`, then
    /// link each one to the best compliant product the stores carry for it.
    ///
    /// `unsuitable` is shown to the model so it avoids suggesting the same
    /// products again.
    pub async fn suggest_substitutes(
        &self,
        ingredient: &Ingredient,
        stores: &[Arc<dyn StoreAdapter>],
        profile: &DietaryProfile,
        unsuitable: &[Product],
    ) -> Result<Vec<Substitute>, Box<dyn Error + Send + Sync>> {
        let provider = self
            .substitutes
            .as_ref()
            .ok_or("No completion provider configured for substitutes")?;

        let prompt = substitute_prompt(ingredient, profile, unsuitable)?;
        debug!(
            "Asking {} for substitutes for {:?}",
            provider.provider_name(),
            ingredient.name
        );
        let reply = provider.complete(&prompt).await?;
        let suggestions = parse_suggestions(&reply, &ingredient.name)?;

        let substitutes = join_all(suggestions.into_iter().map(|suggestion| async move {
            let (found, _) = self.gather(&suggestion.name, stores).await;
            let compliant: Vec<Product> = found
                .into_iter()
                .filter(|p| self.checker.check(p, profile).safe)
                .collect();
            let product = self
                .rank(&ingredient.quantity, compliant)
                .into_iter()
                .next()
                .map(|(_, p)| p);
            Substitute {
                name: suggestion.name,
                reason: suggestion.reason,
                product,
            }
        }))
        .await;

        info!(
            "{} substitutes for {:?}, {} in stock",
            substitutes.len(),
            ingredient.name,
            substitutes.iter().filter(|s| s.product.is_some()).count()
        );
        Ok(substitutes)
    }

    /// Best candidate first. Ties on score go to the cheaper product, then to
    /// the one seen first.
    fn rank(&self, target: &Quantity, products: Vec<Product>) -> Vec<(Option<f64>, Product)> {
        let mut scored: Vec<(Option<f64>, Product)> = products
            .into_iter()
            .map(|p| (self.weights.score(target, &p), p))
            .collect();
        scored.sort_by(|(a_score, a), (b_score, b)| {
            compare_scores(*a_score, *b_score).then_with(|| a.price.total_cmp(&b.price))
        });
        scored
    }

    /// Query all stores at once. A failing store contributes nothing but a
    /// recorded failure.
    async fn gather(
        &self,
        query: &str,
        stores: &[Arc<dyn StoreAdapter>],
    ) -> (Vec<Product>, Vec<StoreQueryFailure>) {
        let results = join_all(stores.iter().map(|store| async move {
            (store.name(), store.search_products(query, &self.location).await)
        }))
        .await;

        let mut products = Vec::new();
        let mut failures = Vec::new();
        for (store, result) in results {
            match result {
                Ok(found) => products.extend(found.into_iter().filter(|p| p.in_stock)),
                Err(e) => {
                    warn!("Store {} failed for {:?}: {}", store, query, e);
                    failures.push(StoreQueryFailure {
                        store: store.to_string(),
                        query: query.to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }
        (products, failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dietary::Diet;
    use crate::error::StoreError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticStore {
        name: &'static str,
        products: Vec<Product>,
    }

    #[async_trait]
    impl StoreAdapter for StaticStore {
        fn name(&self) -> &str {
            self.name
        }

        async fn search_products(&self, _query: &str, _location: &str) -> Result<Vec<Product>, StoreError> {
            Ok(self.products.clone())
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl StoreAdapter for BrokenStore {
        fn name(&self) -> &str {
            "broken"
        }

        async fn search_products(&self, _query: &str, _location: &str) -> Result<Vec<Product>, StoreError> {
            Err(StoreError::Status(500))
        }
    }

    /// Answers per query, nothing for unknown queries
    struct ShelfStore {
        shelf: HashMap<&'static str, Vec<Product>>,
    }

    #[async_trait]
    impl StoreAdapter for ShelfStore {
        fn name(&self) -> &str {
            "shelf"
        }

        async fn search_products(&self, query: &str, _location: &str) -> Result<Vec<Product>, StoreError> {
            Ok(self.shelf.get(query).cloned().unwrap_or_default())
        }
    }

    struct CountingProvider {
        reply: &'static str,
        calls: AtomicUsize,
    }

    impl CountingProvider {
        fn replying(reply: &'static str) -> Arc<Self> {
            Arc::new(CountingProvider {
                reply,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionProvider for CountingProvider {
        fn provider_name(&self) -> &str {
            "counting"
        }

        async fn complete(&self, _prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.to_string())
        }
    }

    const OAT_AND_SOY: &str = r#"{"suggestions": [
        {"name": "oat milk", "reason": "Same pour and sweetness"},
        {"name": "soy milk", "reason": "Higher protein"}
    ]}"#;

    fn product(id: &str, price: f64, grams: f64, ingredients: &[&str]) -> Product {
        Product {
            id: id.to_string(),
            store: "static".to_string(),
            name: format!("Product {id}"),
            brand: "Brand".to_string(),
            price,
            package_size: Quantity::new(grams, "g"),
            unit_price: None,
            ingredients_text: ingredients.iter().map(|s| s.to_string()).collect(),
            allergen_warnings: Vec::new(),
            in_stock: true,
        }
    }

    fn ingredient(name: &str, grams: f64) -> Ingredient {
        Ingredient {
            original: format!("{grams} g {name}"),
            name: name.to_string(),
            quantity: Quantity::new(grams, "g"),
            notes: None,
        }
    }

    fn stores(list: Vec<Arc<dyn StoreAdapter>>) -> Vec<Arc<dyn StoreAdapter>> {
        list
    }

    #[tokio::test]
    async fn test_selects_highest_score() {
        let store = StaticStore {
            name: "static",
            products: vec![
                product("far", 2.0, 1000.0, &["butter"]),
                product("close", 2.0, 240.0, &["butter"]),
            ],
        };
        let matcher = ProductMatcher::new("2000");
        let result = matcher
            .match_ingredient(&ingredient("butter", 200.0), &stores(vec![Arc::new(store)]), None)
            .await;

        assert_eq!(result.selected.unwrap().id, "close");
        assert_eq!(result.candidates.len(), 2);
        assert!(result.score.is_some());
    }

    #[tokio::test]
    async fn test_equal_scores_prefer_cheaper_then_first_seen() {
        // price does not change the score when the price term is off
        let weights = ScoringWeights {
            price_per_unit: 0.0,
            ..Default::default()
        };
        let dear = product("dear", 3.0, 240.0, &["rice"]);
        let cheap = product("cheap", 2.0, 240.0, &["rice"]);
        let first = product("first", 2.0, 240.0, &["rice"]);

        let store = StaticStore {
            name: "static",
            products: vec![dear, first, cheap],
        };
        let matcher = ProductMatcher::new("2000").with_weights(weights);
        let list = stores(vec![Arc::new(store)]);

        for _ in 0..5 {
            let result = matcher.match_ingredient(&ingredient("rice", 200.0), &list, None).await;
            let order: Vec<&str> = result.candidates.iter().map(|p| p.id.as_str()).collect();
            assert_eq!(order, vec!["first", "cheap", "dear"]);
        }
    }

    #[tokio::test]
    async fn test_failing_store_is_isolated() {
        let good = StaticStore {
            name: "good",
            products: vec![product("ok", 2.0, 500.0, &["sugar"])],
        };
        let list = stores(vec![Arc::new(BrokenStore), Arc::new(good)]);
        let result = ProductMatcher::new("2000")
            .match_ingredient(&ingredient("sugar", 500.0), &list, None)
            .await;

        assert_eq!(result.selected.unwrap().id, "ok");
        assert_eq!(result.store_failures.len(), 1);
        assert_eq!(result.store_failures[0].store, "broken");
        assert_eq!(result.store_failures[0].query, "sugar");
    }

    #[tokio::test]
    async fn test_compliance_filter_and_fallback() {
        let store = StaticStore {
            name: "static",
            products: vec![
                product("dairy", 1.0, 500.0, &["milk"]),
                product("oat", 3.0, 500.0, &["oats", "water"]),
            ],
        };
        let list = stores(vec![Arc::new(store)]);
        let matcher = ProductMatcher::new("2000");

        let vegan = DietaryProfile::with_diet(Diet::Vegan);
        let result = matcher
            .match_ingredient(&ingredient("milk", 500.0), &list, Some(&vegan))
            .await;
        assert_eq!(result.selected.as_ref().unwrap().id, "oat");
        assert_eq!(result.candidates.len(), 1);
        assert!(result.warnings.is_empty());

        let strict = DietaryProfile::with_diet(Diet::Vegan).avoid("water", None);
        let result = matcher
            .match_ingredient(&ingredient("milk", 500.0), &list, Some(&strict))
            .await;
        assert!(result.selected.is_some());
        assert_eq!(result.candidates.len(), 2);
        assert_eq!(result.warnings, vec![NO_COMPLIANT_PRODUCTS]);
    }

    #[tokio::test]
    async fn test_out_of_stock_dropped() {
        let mut gone = product("gone", 1.0, 500.0, &["salt"]);
        gone.in_stock = false;
        let store = StaticStore {
            name: "static",
            products: vec![gone],
        };
        let result = ProductMatcher::new("2000")
            .match_ingredient(&ingredient("salt", 5.0), &stores(vec![Arc::new(store)]), None)
            .await;
        assert!(!result.is_matched());
        assert!(result.candidates.is_empty());
        assert_eq!(result.score, None);
    }

    #[tokio::test]
    async fn test_match_all_keeps_order() {
        let store = StaticStore {
            name: "static",
            products: vec![product("x", 1.0, 100.0, &["thing"])],
        };
        let list = stores(vec![Arc::new(store)]);
        let ingredients = vec![ingredient("a", 1.0), ingredient("b", 2.0), ingredient("c", 3.0)];
        let results = ProductMatcher::new("2000").match_all(&ingredients, &list, None).await;
        let names: Vec<&str> = results.iter().map(|m| m.ingredient.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_unsized_candidate_never_beats_sized() {
        let block = product("block_500g", 5.0, 500.0, &["cream", "salt"]);
        let mut unsized_product = product("unsized_6x", 40.0, 0.0, &["cream", "salt"]);
        unsized_product.package_size = Quantity::unspecified();
        let store = StaticStore {
            name: "static",
            products: vec![unsized_product, block],
        };

        let result = ProductMatcher::new("2000")
            .match_ingredient(&ingredient("butter", 250.0), &stores(vec![Arc::new(store)]), None)
            .await;

        let order: Vec<&str> = result.candidates.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(order, vec!["block_500g", "unsized_6x"]);
        assert_eq!(result.selected.unwrap().id, "block_500g");
        // 500 g for 250 g scores far below zero and still wins
        assert!(result.score.unwrap() < 0.0);
    }

    #[tokio::test]
    async fn test_only_unsized_candidates_have_no_score() {
        let mut dear = product("dear", 9.0, 0.0, &["salt"]);
        dear.package_size = Quantity::unspecified();
        let mut cheap = dear.clone();
        cheap.id = "cheap".to_string();
        cheap.price = 2.0;
        let store = StaticStore {
            name: "static",
            products: vec![dear, cheap],
        };

        let result = ProductMatcher::new("2000")
            .match_ingredient(&ingredient("salt", 5.0), &stores(vec![Arc::new(store)]), None)
            .await;
        assert_eq!(result.selected.unwrap().id, "cheap");
        assert_eq!(result.score, None);
    }

    #[tokio::test]
    async fn test_substitutes_when_nothing_complies() {
        let mut shelf = HashMap::new();
        shelf.insert("milk", vec![product("dairy", 1.6, 1000.0, &["milk"])]);
        shelf.insert(
            "oat milk",
            vec![
                product("oat-latte", 1.0, 1000.0, &["milk", "oats"]),
                product("oat", 2.9, 1000.0, &["water", "oats"]),
            ],
        );
        let list = stores(vec![Arc::new(ShelfStore { shelf })]);
        let provider = CountingProvider::replying(OAT_AND_SOY);
        let matcher = ProductMatcher::new("2000").with_substitutes(provider.clone());

        let vegan = DietaryProfile::with_diet(Diet::Vegan);
        let result = matcher
            .match_ingredient(&ingredient("milk", 1000.0), &list, Some(&vegan))
            .await;

        assert_eq!(provider.calls(), 1);
        assert_eq!(result.selected.as_ref().unwrap().id, "dairy");
        assert_eq!(result.warnings, vec![NO_COMPLIANT_PRODUCTS]);
        assert_eq!(result.substitutes.len(), 2);
        assert_eq!(result.substitutes[0].name, "oat milk");
        assert_eq!(result.substitutes[0].reason.as_deref(), Some("Same pour and sweetness"));
        assert_eq!(result.substitutes[0].product.as_ref().unwrap().id, "oat");
        assert_eq!(result.substitutes[1].name, "soy milk");
        assert!(result.substitutes[1].product.is_none());
    }

    #[tokio::test]
    async fn test_no_substitutes_when_a_product_complies() {
        let mut shelf = HashMap::new();
        shelf.insert(
            "milk",
            vec![
                product("dairy", 1.6, 1000.0, &["milk"]),
                product("oat", 2.9, 1000.0, &["water", "oats"]),
            ],
        );
        let list = stores(vec![Arc::new(ShelfStore { shelf })]);
        let provider = CountingProvider::replying(OAT_AND_SOY);
        let matcher = ProductMatcher::new("2000").with_substitutes(provider.clone());

        let vegan = DietaryProfile::with_diet(Diet::Vegan);
        let result = matcher
            .match_ingredient(&ingredient("milk", 1000.0), &list, Some(&vegan))
            .await;

        assert_eq!(result.selected.unwrap().id, "oat");
        assert!(result.substitutes.is_empty());
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_bad_substitute_reply_keeps_the_match() {
        let mut shelf = HashMap::new();
        shelf.insert("milk", vec![product("dairy", 1.6, 1000.0, &["milk"])]);
        let list = stores(vec![Arc::new(ShelfStore { shelf })]);
        let provider = CountingProvider::replying("Have you tried oat milk?");
        let matcher = ProductMatcher::new("2000").with_substitutes(provider.clone());

        let vegan = DietaryProfile::with_diet(Diet::Vegan);
        let result = matcher
            .match_ingredient(&ingredient("milk", 1000.0), &list, Some(&vegan))
            .await;

        assert_eq!(provider.calls(), 1);
        assert_eq!(result.selected.unwrap().id, "dairy");
        assert_eq!(result.warnings, vec![NO_COMPLIANT_PRODUCTS]);
        assert!(result.substitutes.is_empty());
    }

    #[tokio::test]
    async fn test_suggest_substitutes_needs_a_provider() {
        let list = stores(vec![Arc::new(ShelfStore {
            shelf: HashMap::new(),
        })]);
        let result = ProductMatcher::new("2000")
            .suggest_substitutes(
                &ingredient("milk", 1000.0),
                &list,
                &DietaryProfile::with_diet(Diet::Vegan),
                &[],
            )
            .await;
        assert!(result.is_err());
    }
}
