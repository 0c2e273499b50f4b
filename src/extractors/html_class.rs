use super::{element_text, fallback_title, Extractor, ParsingContext};
use crate::model::{ExtractedRecipe, RecipeSource};
use log::debug;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::sync::LazyLock;

pub struct HtmlClassExtractor;

/// Class names used by common recipe card plugins, then loose substrings
struct ClassMatchers {
    exact: HashMap<&'static str, &'static [&'static str]>,
    fuzzy: HashMap<&'static str, &'static [&'static str]>,
}

static MATCHERS: LazyLock<ClassMatchers> = LazyLock::new(ClassMatchers::new);

// Fuzzy matches larger than this are most likely the whole page
const FUZZY_TEXT_LIMIT: usize = 5000;

const EXACT_TITLE: &[&str] = &[
    "wprm-recipe-name",
    "tasty-recipes-title",
    "mv-create-title",
    "recipe-name",
    "recipe-title",
    "recipe-card-title",
    "wpzoom-recipe-card-title",
    "recipe-card__title",
];

const EXACT_DESCRIPTION: &[&str] = &[
    "wprm-recipe-summary",
    "tasty-recipes-description",
    "mv-create-description",
    "recipe-summary",
    "recipe-description",
    "recipe-intro",
];

const EXACT_INGREDIENTS: &[&str] = &[
    "wprm-recipe-ingredients-container",
    "tasty-recipes-ingredients",
    "mv-create-ingredients",
    "recipe-ingredients",
    "recipe-ingredient-list",
    "recipe-card-ingredients",
    "wpzoom-recipe-ingredients",
    "structured-ingredients",
    "ingredients",
];

const EXACT_INSTRUCTIONS: &[&str] = &[
    "wprm-recipe-instructions-container",
    "tasty-recipes-instructions",
    "mv-create-instructions",
    "recipe-instructions",
    "recipe-instruction-list",
    "recipe-card-instructions",
    "wpzoom-recipe-instructions",
    "structured-instructions",
    "recipe-directions",
    "directions",
    "method",
];

const EXACT_PREP_TIME: &[&str] = &[
    "wprm-recipe-prep_time-container",
    "wprm-recipe-prep-time",
    "tasty-recipes-prep-time",
    "mv-create-time-prep",
    "recipe-prep-time",
    "prep-time",
];

const EXACT_COOK_TIME: &[&str] = &[
    "wprm-recipe-cook_time-container",
    "wprm-recipe-cook-time",
    "tasty-recipes-cook-time",
    "mv-create-time-active",
    "recipe-cook-time",
    "cook-time",
];

const EXACT_TOTAL_TIME: &[&str] = &[
    "wprm-recipe-total_time-container",
    "wprm-recipe-total-time",
    "tasty-recipes-total-time",
    "mv-create-time-total",
    "recipe-total-time",
    "total-time",
];

const EXACT_SERVINGS: &[&str] = &[
    "wprm-recipe-servings",
    "tasty-recipes-yield",
    "mv-create-yield",
    "recipe-servings",
    "recipe-yield",
    "servings",
];

impl ClassMatchers {
    fn new() -> Self {
        let exact = HashMap::from([
            ("title", EXACT_TITLE),
            ("description", EXACT_DESCRIPTION),
            ("ingredients", EXACT_INGREDIENTS),
            ("instructions", EXACT_INSTRUCTIONS),
            ("prep_time", EXACT_PREP_TIME),
            ("cook_time", EXACT_COOK_TIME),
            ("total_time", EXACT_TOTAL_TIME),
            ("servings", EXACT_SERVINGS),
        ]);
        let fuzzy: HashMap<&'static str, &'static [&'static str]> = HashMap::from([
            ("title", &["recipe-title", "recipe-name"] as &[&str]),
            ("description", &["summary", "description"] as &[&str]),
            ("ingredients", &["ingredient"] as &[&str]),
            ("instructions", &["instruction", "direction", "method", "step"] as &[&str]),
            ("servings", &["yield", "serving"] as &[&str]),
        ]);

        ClassMatchers { exact, fuzzy }
    }

    fn select<'a>(document: &'a Html, selector: &str) -> Vec<ElementRef<'a>> {
        match Selector::parse(selector) {
            Ok(selector) => document.select(&selector).collect(),
            Err(_) => Vec::new(),
        }
    }

    fn find_by_class(&self, document: &Html, field: &str) -> Option<String> {
        let exact = self.exact.get(field).copied().unwrap_or_default();
        for class_name in exact {
            let text = Self::select(document, &format!(".{class_name}"))
                .iter()
                .map(element_text)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            if !text.is_empty() {
                debug!("Found {} using exact class: {}", field, class_name);
                return Some(text);
            }
        }

        let fuzzy = self.fuzzy.get(field).copied().unwrap_or_default();
        for pattern in fuzzy {
            let text = Self::select(document, &format!("[class*='{pattern}']"))
                .first()
                .map(element_text)
                .unwrap_or_default();
            if !text.is_empty() && text.len() < FUZZY_TEXT_LIMIT {
                debug!("Found {} using fuzzy class pattern: {}", field, pattern);
                return Some(text);
            }
        }

        None
    }

    fn extract_list_items(&self, document: &Html, field: &str) -> Vec<String> {
        let exact = self.exact.get(field).copied().unwrap_or_default();
        let fuzzy = self.fuzzy.get(field).copied().unwrap_or_default();
        let selectors = exact
            .iter()
            .map(|class_name| format!(".{class_name}"))
            .chain(fuzzy.iter().map(|pattern| format!("[class*='{pattern}']")));

        for selector in selectors {
            let mut items = Vec::new();
            for container in outermost(Self::select(document, &selector)) {
                items.extend(container_items(container));
            }
            if !items.is_empty() {
                debug!("Found {} {} using {}", items.len(), field, selector);
                return items;
            }
        }

        Vec::new()
    }
}

/// Drop matches nested inside another match, so a section and the list
/// inside it are read once
fn outermost(containers: Vec<ElementRef>) -> Vec<ElementRef> {
    containers
        .iter()
        .copied()
        .filter(|el| {
            !el.ancestors()
                .any(|ancestor| containers.iter().any(|c| c.id() == ancestor.id()))
        })
        .collect()
}

/// List items of a container, falling back to its paragraphs. A matched
/// `li` is an item itself.
fn container_items(container: ElementRef) -> Vec<String> {
    if container.value().name() == "li" {
        let text = element_text(&container);
        return if text.is_empty() { Vec::new() } else { vec![text] };
    }

    let li = Selector::parse("li").expect("valid selector");
    let items: Vec<String> = container
        .select(&li)
        .map(|el| element_text(&el))
        .filter(|text| !text.is_empty())
        .collect();
    if !items.is_empty() {
        return items;
    }

    let blocks = Selector::parse("p, div").expect("valid selector");
    container
        .select(&blocks)
        // only leaf blocks, so wrappers don't repeat their children
        .filter(|el| el.select(&blocks).next().is_none())
        .map(|el| element_text(&el))
        .filter(|text| text.len() > 2 && text.len() < 500)
        .collect()
}

impl Extractor for HtmlClassExtractor {
    fn name(&self) -> &'static str {
        "html_class"
    }

    fn parse(&self, context: &ParsingContext) -> Result<ExtractedRecipe, Box<dyn std::error::Error>> {
        debug!("Attempting to extract recipe using HTML class matchers");
        let document = &context.document;
        let matchers = &*MATCHERS;

        let mut recipe = ExtractedRecipe::empty(RecipeSource::Heuristic);
        recipe.ingredient_lines = matchers.extract_list_items(document, "ingredients");
        recipe.instructions = matchers.extract_list_items(document, "instructions");
        if recipe.ingredient_lines.is_empty() || recipe.instructions.is_empty() {
            return Err("Could not extract recipe content from HTML".into());
        }

        recipe.title = matchers
            .find_by_class(document, "title")
            .or_else(|| fallback_title(document))
            .ok_or("Could not extract recipe title from HTML")?;
        recipe.description = matchers.find_by_class(document, "description");
        recipe.prep_time = matchers.find_by_class(document, "prep_time");
        recipe.cook_time = matchers.find_by_class(document, "cook_time");
        recipe.total_time = matchers.find_by_class(document, "total_time");
        recipe.servings = matchers.find_by_class(document, "servings");

        debug!(
            "HTML classes gave {} ingredients and {} instructions for {}",
            recipe.ingredient_lines.len(),
            recipe.instructions.len(),
            context.url
        );
        Ok(recipe)
    }
}
