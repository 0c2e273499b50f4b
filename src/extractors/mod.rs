use log::{debug, info, warn};
use scraper::{ElementRef, Html, Selector};
use std::error::Error;
use std::sync::Arc;

use crate::config::ShopperConfig;
use crate::error::ShopperError;
use crate::fetchers::PageFetcher;
use crate::model::{ExtractedRecipe, RawPage};
use crate::providers::{CompletionProvider, ProviderFactory};

mod completion;
mod html_class;
mod json_ld;
mod microdata;

pub use completion::{visible_text, CompletionExtractor, RECIPE_EXTRACTION_PROMPT};
pub use html_class::HtmlClassExtractor;
pub use json_ld::{convert_duration, JsonLdExtractor};
pub use microdata::MicroDataExtractor;

pub struct ParsingContext {
    pub url: String,
    pub document: Html,
}

impl ParsingContext {
    pub fn new(page: &RawPage) -> Self {
        ParsingContext {
            url: page.url.clone(),
            document: Html::parse_document(&page.html),
        }
    }
}

/// A markup extraction strategy. Implementations return whatever they
/// found; the cascade validates the result.
pub trait Extractor: Send + Sync {
    fn name(&self) -> &'static str;
    fn parse(&self, context: &ParsingContext) -> Result<ExtractedRecipe, Box<dyn Error>>;
}

/// Runs markup extractors in order, then the completion stage as a last
/// resort.
pub struct RecipeExtractor {
    extractors: Vec<Box<dyn Extractor>>,
    completion: Option<CompletionExtractor>,
}

impl Default for RecipeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl RecipeExtractor {
    /// JSON-LD, microdata and class heuristics, without a completion stage
    pub fn new() -> Self {
        RecipeExtractor {
            extractors: vec![
                Box::new(JsonLdExtractor),
                Box::new(MicroDataExtractor),
                Box::new(HtmlClassExtractor),
            ],
            completion: None,
        }
    }

    /// Markup extractors in the given order; unknown names are skipped
    pub fn with_order<S: AsRef<str>>(order: &[S]) -> Self {
        let extractors = order
            .iter()
            .filter_map(|name| match name.as_ref() {
                "json_ld" => Some(Box::new(JsonLdExtractor) as Box<dyn Extractor>),
                "microdata" => Some(Box::new(MicroDataExtractor) as Box<dyn Extractor>),
                "html_class" => Some(Box::new(HtmlClassExtractor) as Box<dyn Extractor>),
                other => {
                    warn!("Unknown extractor in configuration: {}", other);
                    None
                }
            })
            .collect();
        RecipeExtractor {
            extractors,
            completion: None,
        }
    }

    /// Build from configuration. A provider that cannot be created disables
    /// the completion stage instead of failing.
    pub fn from_config(config: &ShopperConfig) -> Self {
        let extractor = Self::with_order(&config.extractors.order);
        match ProviderFactory::get_default_provider(config) {
            Ok(provider) => extractor.with_completion(provider, config.extractors.max_text_chars),
            Err(e) => {
                debug!("Completion stage disabled: {}", e);
                extractor
            }
        }
    }

    pub fn with_completion(
        mut self,
        provider: Arc<dyn CompletionProvider>,
        max_text_chars: usize,
    ) -> Self {
        self.completion = Some(CompletionExtractor::new(provider, max_text_chars));
        self
    }

    /// Names of the stages in the order they run
    pub fn stages(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.extractors.iter().map(|e| e.name()).collect();
        if self.completion.is_some() {
            names.push("completion");
        }
        names
    }

    /// Markup stages only, synchronous
    pub fn extract_markup(&self, page: &RawPage) -> Option<ExtractedRecipe> {
        let context = ParsingContext::new(page);
        self.run_markup(&context)
    }

    pub async fn extract(&self, page: &RawPage) -> Result<ExtractedRecipe, ShopperError> {
        // The parsed document is not Send; keep it out of the await below
        let (text, page_title) = {
            let context = ParsingContext::new(page);
            if let Some(recipe) = self.run_markup(&context) {
                return Ok(recipe);
            }
            let text = self
                .completion
                .as_ref()
                .map(|completion| visible_text(&context.document, completion.max_text_chars()));
            (text, fallback_title(&context.document))
        };

        if let (Some(completion), Some(text)) = (&self.completion, text) {
            debug!("Trying completion stage for {}", page.url);
            match completion.extract(&text).await {
                Ok(mut recipe) => {
                    if recipe.title.is_empty() {
                        recipe.title = page_title.unwrap_or_default();
                    }
                    match recipe.validated() {
                        Ok(recipe) => {
                            info!("Extracted {:?} from {} via completion", recipe.title, page.url);
                            return Ok(recipe);
                        }
                        Err(e) => debug!("completion stage rejected: {}", e),
                    }
                }
                Err(e) => debug!("completion stage failed: {}", e),
            }
        }

        warn!("No recipe found at {}", page.url);
        Err(ShopperError::NoRecipeFound {
            url: page.url.clone(),
        })
    }

    /// Fetch `url` and run the cascade on it
    pub async fn fetch_and_extract(
        &self,
        fetcher: &dyn PageFetcher,
        url: &str,
    ) -> Result<ExtractedRecipe, ShopperError> {
        let html = fetcher
            .fetch(url)
            .await
            .map_err(|e| ShopperError::FetchFailed {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        self.extract(&RawPage::new(url, html)).await
    }

    fn run_markup(&self, context: &ParsingContext) -> Option<ExtractedRecipe> {
        for extractor in &self.extractors {
            debug!("Trying {} for {}", extractor.name(), context.url);
            let result = extractor
                .parse(context)
                .map_err(|e| e.to_string())
                .and_then(ExtractedRecipe::validated);
            match result {
                Ok(recipe) => {
                    info!(
                        "Extracted {:?} from {} via {}",
                        recipe.title,
                        context.url,
                        extractor.name()
                    );
                    return Some(recipe);
                }
                Err(e) => debug!("{} failed: {}", extractor.name(), e),
            }
        }
        None
    }
}

/// Whitespace-normalized text of an element
pub(crate) fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Page title from the first `h1`, then `<title>`
pub(crate) fn fallback_title(document: &Html) -> Option<String> {
    ["h1", "title"].iter().find_map(|tag| {
        let selector = Selector::parse(tag).ok()?;
        document
            .select(&selector)
            .map(|el| element_text(&el))
            .find(|text| !text.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stage_order() {
        assert_eq!(
            RecipeExtractor::new().stages(),
            vec!["json_ld", "microdata", "html_class"]
        );
    }

    #[test]
    fn test_configured_order_skips_unknown() {
        let extractor = RecipeExtractor::with_order(&["html_class", "ocr", "json_ld"]);
        assert_eq!(extractor.stages(), vec!["html_class", "json_ld"]);
    }

    #[test]
    fn test_fallback_title() {
        let document = Html::parse_document(
            "<html><head><title>Site | Soup</title></head><body><h1> Pumpkin  Soup </h1></body></html>",
        );
        assert_eq!(fallback_title(&document).as_deref(), Some("Pumpkin Soup"));

        let document = Html::parse_document("<html><head><title>Soup</title></head><body></body></html>");
        assert_eq!(fallback_title(&document).as_deref(), Some("Soup"));
    }

    #[tokio::test]
    async fn test_nothing_found_keeps_url() {
        let page = RawPage::new("https://example.com/about", "<html><body><p>About us</p></body></html>");
        let err = RecipeExtractor::new().extract(&page).await.unwrap_err();
        assert_eq!(err.to_string(), "No recipe found at https://example.com/about");
    }
}
