use super::{Extractor, ParsingContext};
use crate::model::{ExtractedRecipe, Nutrition, Rating, RecipeSource};
use html_escape::decode_html_entities;
use log::debug;
use regex::Regex;
use scraper::Selector;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;

pub struct JsonLdExtractor;

impl JsonLdExtractor {
    fn convert_to_recipe(&self, json_ld_recipe: JsonLdRecipe) -> ExtractedRecipe {
        let mut recipe = ExtractedRecipe::empty(RecipeSource::Structured);
        recipe.title = decode_html_symbols(&json_ld_recipe.name);

        recipe.description = json_ld_recipe.description.and_then(|desc| {
            let decoded = match desc {
                DescriptionType::String(d) => decode_html_symbols(&d),
                DescriptionType::Object(d) => decode_html_symbols(&d.text),
            };
            non_empty(decoded)
        });

        recipe.author = json_ld_recipe.author.and_then(|author| match author {
            Author::String(name) => non_empty(name),
            Author::Object(obj) => obj.name.and_then(non_empty),
            Author::Multiple(authors) => {
                let names: Vec<String> = authors.into_iter().filter_map(|a| a.name).collect();
                non_empty(names.join(", "))
            }
        });

        recipe.servings = json_ld_recipe.recipe_yield.and_then(|yield_val| match yield_val {
            RecipeYield::String(s) => non_empty(s),
            RecipeYield::Number(n) => Some(n.to_string()),
            // prefer the descriptive entry ("4 servings") over the bare number
            RecipeYield::Array(arr) => arr
                .iter()
                .find(|s| s.contains(char::is_alphabetic))
                .or_else(|| arr.first())
                .cloned()
                .and_then(non_empty),
        });

        recipe.prep_time = json_ld_recipe.prep_time.as_deref().and_then(duration_field);
        recipe.cook_time = json_ld_recipe.cook_time.as_deref().and_then(duration_field);
        recipe.total_time = json_ld_recipe.total_time.as_deref().and_then(duration_field);

        recipe.category = json_ld_recipe
            .recipe_category
            .map(StringList::into_vec)
            .unwrap_or_default();
        recipe.cuisine = json_ld_recipe
            .recipe_cuisine
            .map(StringList::into_vec)
            .unwrap_or_default();
        recipe.tags = match json_ld_recipe.keywords {
            Some(StringList::String(s)) => s
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            Some(StringList::Multiple(v)) => v,
            None => Vec::new(),
        };

        recipe.image = json_ld_recipe.image.and_then(|img| match img {
            ImageType::String(i) => non_empty(decode_html_symbols(&i)),
            ImageType::MultipleStrings(imgs) => imgs.first().map(|i| decode_html_symbols(i)),
            ImageType::Object(i) => non_empty(i.url),
            ImageType::MultipleObjects(imgs) => imgs.into_iter().next().map(|i| i.url),
            ImageType::None => None,
        });

        recipe.ingredient_lines = match json_ld_recipe.recipe_ingredient {
            Some(RecipeIngredients::Strings(ingredients)) => ingredients
                .into_iter()
                .filter(|ing| !ing.trim().is_empty())
                .map(|ing| decode_html_symbols(&ing))
                .collect(),
            Some(RecipeIngredients::Objects(ingredients)) => ingredients
                .into_iter()
                .filter(|ing| !ing.name.trim().is_empty())
                .map(|ing| {
                    let amount = ing.amount.as_deref().unwrap_or("").trim();
                    let name = decode_html_symbols(&ing.name);
                    if amount.is_empty() {
                        name
                    } else {
                        format!("{amount} {name}")
                    }
                })
                .collect(),
            None => Vec::new(),
        };

        recipe.instructions = match json_ld_recipe.recipe_instructions {
            Some(RecipeInstructions::String(text)) => decode_html_symbols(&text)
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            Some(RecipeInstructions::Multiple(steps)) => {
                steps.iter().map(|step| decode_html_symbols(step)).collect()
            }
            Some(RecipeInstructions::MultipleObject(steps)) => {
                steps.iter().map(|obj| decode_html_symbols(&obj.text)).collect()
            }
            Some(RecipeInstructions::HowTo(sections)) => sections
                .into_iter()
                .flat_map(howto_texts)
                .map(|text| decode_html_symbols(&text))
                .collect(),
            Some(RecipeInstructions::NestedSections(sections)) => sections
                .into_iter()
                .flatten()
                .flat_map(howto_texts)
                .map(|text| decode_html_symbols(&text))
                .collect(),
            None => Vec::new(),
        };

        recipe.nutrition = json_ld_recipe.nutrition.map(|n| Nutrition {
            calories: n.calories.map(Text::into_string),
            protein: n.protein_content.map(Text::into_string),
            carbohydrates: n.carbohydrate_content.map(Text::into_string),
            fat: n.fat_content.map(Text::into_string),
            fiber: n.fiber_content.map(Text::into_string),
            sugar: n.sugar_content.map(Text::into_string),
            sodium: n.sodium_content.map(Text::into_string),
        });

        recipe.rating = json_ld_recipe.aggregate_rating.and_then(|r| {
            let value = r.rating_value?.into_string().parse::<f64>().ok()?;
            let count = r
                .rating_count
                .or(r.review_count)
                .and_then(|c| c.into_string().parse::<u64>().ok());
            Some(Rating { value, count })
        });

        recipe
    }
}

#[derive(Debug, Deserialize)]
struct JsonLdRecipe {
    name: String,
    description: Option<DescriptionType>,
    image: Option<ImageType>,
    #[serde(rename = "recipeIngredient", alias = "ingredients")]
    recipe_ingredient: Option<RecipeIngredients>,
    #[serde(rename = "recipeInstructions")]
    recipe_instructions: Option<RecipeInstructions>,
    #[serde(rename = "recipeYield")]
    recipe_yield: Option<RecipeYield>,
    #[serde(rename = "prepTime")]
    prep_time: Option<String>,
    #[serde(rename = "cookTime")]
    cook_time: Option<String>,
    #[serde(rename = "totalTime")]
    total_time: Option<String>,
    #[serde(rename = "recipeCategory")]
    recipe_category: Option<StringList>,
    #[serde(rename = "recipeCuisine")]
    recipe_cuisine: Option<StringList>,
    keywords: Option<StringList>,
    author: Option<Author>,
    nutrition: Option<NutritionInformation>,
    #[serde(rename = "aggregateRating")]
    aggregate_rating: Option<AggregateRating>,
}

#[derive(Debug, Deserialize)]
struct ImageObject {
    url: String,
}

#[derive(Debug, Deserialize)]
struct TextObject {
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DescriptionType {
    String(String),
    Object(TextObject),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ImageType {
    None,
    String(String),
    Object(ImageObject),
    MultipleStrings(Vec<String>),
    MultipleObjects(Vec<ImageObject>),
}

#[derive(Debug, Deserialize)]
struct RecipeInstructionObject {
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecipeIngredients {
    Strings(Vec<String>),
    Objects(Vec<IngredientObject>),
}

#[derive(Debug, Deserialize)]
struct IngredientObject {
    name: String,
    amount: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecipeInstructions {
    String(String),
    Multiple(Vec<String>),
    MultipleObject(Vec<RecipeInstructionObject>),
    HowTo(Vec<HowTo>),
    NestedSections(Vec<Vec<HowTo>>),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "@type")]
enum HowTo {
    HowToStep(HowToStep),
    HowToSection(HowToSection),
}

#[derive(Debug, Deserialize)]
struct HowToStep {
    text: Option<String>,
    description: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HowToSection {
    #[serde(rename = "itemListElement")]
    item_list_element: Vec<HowToStep>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecipeYield {
    String(String),
    Number(serde_json::Number),
    Array(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringList {
    String(String),
    Multiple(Vec<String>),
}

impl StringList {
    fn into_vec(self) -> Vec<String> {
        match self {
            StringList::String(s) if s.trim().is_empty() => Vec::new(),
            StringList::String(s) => vec![s],
            StringList::Multiple(v) => v,
        }
    }
}

/// Schema.org values published as either a string or a bare number
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Text {
    String(String),
    Number(serde_json::Number),
}

impl Text {
    fn into_string(self) -> String {
        match self {
            Text::String(s) => s,
            Text::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Author {
    String(String),
    Object(AuthorObject),
    Multiple(Vec<AuthorObject>),
}

#[derive(Debug, Deserialize)]
struct AuthorObject {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NutritionInformation {
    calories: Option<Text>,
    protein_content: Option<Text>,
    carbohydrate_content: Option<Text>,
    fat_content: Option<Text>,
    fiber_content: Option<Text>,
    sugar_content: Option<Text>,
    sodium_content: Option<Text>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AggregateRating {
    rating_value: Option<Text>,
    rating_count: Option<Text>,
    review_count: Option<Text>,
}

impl TryFrom<&Value> for JsonLdRecipe {
    type Error = serde_json::Error;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value.clone())
    }
}

fn howto_texts(howto: HowTo) -> Vec<String> {
    match howto {
        HowTo::HowToStep(step) => step_texts(step),
        HowTo::HowToSection(section) => section
            .item_list_element
            .into_iter()
            .flat_map(step_texts)
            .collect(),
    }
}

fn step_texts(step: HowToStep) -> Vec<String> {
    let mut texts = Vec::new();
    // Prefer text over name
    if let Some(text) = step.text.or(step.name) {
        texts.push(text);
    }
    if let Some(desc) = step.description {
        texts.push(desc);
    }
    texts
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn duration_field(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        None
    } else {
        Some(convert_duration(raw))
    }
}

fn decode_html_symbols(text: &str) -> String {
    // for some reason need to decode twice to get the correct string
    decode_html_entities(&decode_html_entities(text)).into_owned()
}

static ISO_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?xi)^P
        (?:(?P<d>\d+(?:\.\d+)?)D)?
        (?:T
            (?:(?P<h>\d+(?:\.\d+)?)H)?
            (?:(?P<m>\d+(?:\.\d+)?|\d+-\d+)M)?
            (?:(?P<s>\d+(?:\.\d+)?)S)?
        )?$",
    )
    .expect("duration pattern")
});

fn plural(value: u64, unit: &str) -> String {
    format!("{} {}{}", value, unit, if value == 1 { "" } else { "s" })
}

/// Convert an ISO 8601 duration to readable text, e.g. `PT1H30M` and `PT90M`
/// both become `1 hour and 30 minutes`. Days fold into hours, a minute range
/// such as `PT15-20M` is kept, and anything unparsable is returned as is.
pub fn convert_duration(duration: &str) -> String {
    let Some(caps) = ISO_DURATION.captures(duration.trim()) else {
        return duration.to_string();
    };
    if ["d", "h", "m", "s"].iter().all(|k| caps.name(k).is_none()) {
        return duration.to_string();
    }

    let number = |name: &str| -> f64 {
        caps.name(name)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .unwrap_or(0.0)
    };

    if let Some(range) = caps.name("m").filter(|m| m.as_str().contains('-')) {
        let hours = (number("d") * 24.0 + number("h")).round() as u64;
        let mut parts = Vec::new();
        if hours > 0 {
            parts.push(plural(hours, "hour"));
        }
        parts.push(format!("{} minutes", range.as_str()));
        return parts.join(" and ");
    }

    let total_seconds = (number("d") * 86_400.0
        + number("h") * 3_600.0
        + number("m") * 60.0
        + number("s"))
    .round() as u64;
    let hours = total_seconds / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(plural(hours, "hour"));
    }
    if minutes > 0 {
        parts.push(plural(minutes, "minute"));
    }
    if seconds > 0 {
        parts.push(plural(seconds, "second"));
    }
    if parts.is_empty() {
        return plural(0, "minute");
    }
    parts.join(" and ")
}

fn is_recipe_type(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(type_str)) => type_str.eq_ignore_ascii_case("recipe"),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|t| t.eq_ignore_ascii_case("recipe")),
        _ => false,
    }
}

/// First Recipe object in a JSON-LD block: the root, a root array, or `@graph`
fn find_recipe(json_ld: &Value) -> Option<&Value> {
    if let Some(items) = json_ld.as_array() {
        return items.iter().find_map(find_recipe);
    }
    if is_recipe_type(json_ld) {
        return Some(json_ld);
    }
    json_ld
        .get("@graph")
        .and_then(Value::as_array)
        .and_then(|items| items.iter().find(|item| is_recipe_type(item)))
}

impl Extractor for JsonLdExtractor {
    fn name(&self) -> &'static str {
        "json_ld"
    }

    fn parse(&self, context: &ParsingContext) -> Result<ExtractedRecipe, Box<dyn std::error::Error>> {
        debug!("JsonLdExtractor: Starting parse for URL: {}", context.url);
        let selector =
            Selector::parse("script[type='application/ld+json']").expect("valid selector");
        let scripts: Vec<_> = context.document.select(&selector).collect();
        debug!("JsonLdExtractor: Found {} JSON-LD script tags", scripts.len());

        // Try each script element until we find a valid recipe
        for (index, script) in scripts.iter().enumerate() {
            let cleaned_json = sanitize_json(&script.inner_html());
            let json_ld = match serde_json::from_str::<Value>(&cleaned_json) {
                Ok(json_ld) => json_ld,
                Err(e) => {
                    debug!("JsonLdExtractor: Failed to parse JSON-LD {}: {}", index, e);
                    continue;
                }
            };

            let Some(recipe_json) = find_recipe(&json_ld) else {
                debug!("JsonLdExtractor: No recipe found in JSON-LD {}", index);
                continue;
            };

            match JsonLdRecipe::try_from(recipe_json) {
                Ok(recipe) => return Ok(self.convert_to_recipe(recipe)),
                Err(e) => debug!("JsonLdExtractor: Failed to convert to JsonLdRecipe: {}", e),
            }
        }

        Err("No valid recipe found in any JSON-LD script".into())
    }
}

fn sanitize_json(json_str: &str) -> String {
    let mut minified = String::with_capacity(json_str.len());
    let mut in_string = false;
    let mut prev_char = None;
    let mut depth = 0;
    let chars: Vec<char> = json_str.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        match c {
            '"' if prev_char != Some('\\') => {
                in_string = !in_string;
                if !in_string {
                    // closing quote directly followed by another value: missing comma
                    let rest_chars = chars.get(i + 1..).unwrap_or(&[]);
                    let next_char = rest_chars.iter().find(|c| !c.is_whitespace());
                    if !matches!(prev_char, Some(',') | Some('[') | Some('{'))
                        && matches!(next_char, Some('"' | '[' | '{'))
                    {
                        minified.push('"');
                        minified.push(',');
                        prev_char = Some(',');
                        continue;
                    }
                }
                minified.push(c);
            }
            '[' | '{' if !in_string => {
                depth += 1;
                minified.push(c);
            }
            ']' | '}' if !in_string => {
                depth -= 1;
                minified.push(c);
                if let Some(rest_chars) = chars.get(i + 1..) {
                    let next_char = rest_chars.iter().find(|&&c| !c.is_whitespace());
                    if depth > 0 && matches!(next_char, Some(&'"')) {
                        minified.push(',');
                        prev_char = Some(',');
                        continue;
                    }
                }
            }
            ',' if !in_string => {
                if prev_char != Some(',') {
                    minified.push(c);
                }
            }
            ':' if !in_string => {
                if prev_char == Some(',') {
                    minified.pop();
                }
                minified.push(c);
            }
            _ => {
                if in_string || !c.is_whitespace() {
                    minified.push(c);
                }
            }
        }
        prev_char = Some(c);
    }

    minified
        .replace(",]", "]")
        .replace(",}", "}")
        .replace(",,", ",")
        .replace(",:,", ":")
        .replace(":,", ":")
        .replace(",:", ":")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawPage;

    fn create_html_document(json_ld: &str) -> String {
        format!(
            r#"
            <!DOCTYPE html>
            <html>
            <head>
                <script type="application/ld+json">
                    {json_ld}
                </script>
            </head>
            <body></body>
            </html>
            "#
        )
    }

    fn parse(json_ld: &str) -> Result<ExtractedRecipe, Box<dyn std::error::Error>> {
        let page = RawPage::new("http://example.com", create_html_document(json_ld));
        JsonLdExtractor.parse(&ParsingContext::new(&page))
    }

    #[test]
    fn test_no_json_ld() {
        let page = RawPage::new("http://example.com", "<html><body>Test</body></html>");
        assert!(JsonLdExtractor.parse(&ParsingContext::new(&page)).is_err());
    }

    #[test]
    fn test_parse_basic_recipe() {
        let result = parse(
            r#"
        {
            "@context": "https://schema.org/",
            "@type": "Recipe",
            "name": "Chocolate Chip Cookies",
            "description": "Delicious homemade cookies",
            "image": "https://example.com/cookie.jpg",
            "recipeIngredient": ["2 cups flour", "1 cup sugar", "1 cup chocolate chips"],
            "recipeInstructions": "Mix ingredients. Bake at 350F for 10 minutes.",
            "author": "Jane Doe",
            "prepTime": "PT15M",
            "cookTime": "PT10M",
            "totalTime": "PT25M",
            "recipeYield": "24 cookies",
            "recipeCategory": "Dessert",
            "recipeCuisine": "American",
            "keywords": "chocolate, cookies, baking"
        }
        "#,
        )
        .unwrap();

        assert_eq!(result.source, RecipeSource::Structured);
        assert_eq!(result.title, "Chocolate Chip Cookies");
        assert_eq!(result.description.as_deref(), Some("Delicious homemade cookies"));
        assert_eq!(result.image.as_deref(), Some("https://example.com/cookie.jpg"));
        assert_eq!(
            result.ingredient_lines,
            vec!["2 cups flour", "1 cup sugar", "1 cup chocolate chips"]
        );
        assert_eq!(
            result.instructions,
            vec!["Mix ingredients. Bake at 350F for 10 minutes."]
        );
        assert_eq!(result.author.as_deref(), Some("Jane Doe"));
        assert_eq!(result.prep_time.as_deref(), Some("15 minutes"));
        assert_eq!(result.cook_time.as_deref(), Some("10 minutes"));
        assert_eq!(result.total_time.as_deref(), Some("25 minutes"));
        assert_eq!(result.servings.as_deref(), Some("24 cookies"));
        assert_eq!(result.category, vec!["Dessert"]);
        assert_eq!(result.cuisine, vec!["American"]);
        assert_eq!(result.tags, vec!["chocolate", "cookies", "baking"]);
    }

    #[test]
    fn test_duration_conversion() {
        assert_eq!(convert_duration("PT30M"), "30 minutes");
        assert_eq!(convert_duration("PT1H"), "1 hour");
        assert_eq!(convert_duration("PT1H30M"), "1 hour and 30 minutes");
        assert_eq!(convert_duration("PT90M"), "1 hour and 30 minutes");
        assert_eq!(convert_duration("PT2H15M"), "2 hours and 15 minutes");
        assert_eq!(convert_duration("P1DT2H"), "26 hours");
        assert_eq!(convert_duration("PT1M30S"), "1 minute and 30 seconds");
        assert_eq!(convert_duration("invalid"), "invalid");
        assert_eq!(convert_duration("20 mins"), "20 mins");
        // ranges
        assert_eq!(convert_duration("PT15-20M"), "15-20 minutes");
        assert_eq!(convert_duration("PT1H15-20M"), "1 hour and 15-20 minutes");
        // seconds
        assert_eq!(convert_duration("PT5400S"), "1 hour and 30 minutes");
        assert_eq!(convert_duration("PT5400.0S"), "1 hour and 30 minutes");
        assert_eq!(convert_duration("PT300S"), "5 minutes");
        // large minute values
        assert_eq!(convert_duration("PT150M"), "2 hours and 30 minutes");
        assert_eq!(convert_duration("PT180M"), "3 hours");
        assert_eq!(convert_duration("PT0M"), "0 minutes");
    }

    #[test]
    fn test_parse_recipe_in_array_with_howto_steps() {
        let result = parse(
            r#"
        [
            {
                "@context": "https://schema.org/",
                "@type": "Recipe",
                "name": "Pasta Carbonara",
                "image": ["https://example.com/carbonara1.jpg", "https://example.com/carbonara2.jpg"],
                "recipeIngredient": ["400 g spaghetti", "3 eggs", "150 g bacon"],
                "recipeInstructions": [
                    {"@type": "HowToStep", "text": "Cook pasta"},
                    {"@type": "HowToStep", "text": "Fry bacon"},
                    {"@type": "HowToSection", "name": "Finish", "itemListElement": [
                        {"@type": "HowToStep", "text": "Mix eggs and cheese"}
                    ]}
                ],
                "author": {"@type": "Person", "name": "Chef Mario"},
                "recipeYield": 4
            },
            {"@type": "WebSite", "name": "Recipe Website"}
        ]
        "#,
        )
        .unwrap();

        assert_eq!(result.title, "Pasta Carbonara");
        assert_eq!(result.image.as_deref(), Some("https://example.com/carbonara1.jpg"));
        assert_eq!(
            result.instructions,
            vec!["Cook pasta", "Fry bacon", "Mix eggs and cheese"]
        );
        assert_eq!(result.author.as_deref(), Some("Chef Mario"));
        assert_eq!(result.servings.as_deref(), Some("4"));
    }

    #[test]
    fn test_type_array_and_graph() {
        let result = parse(
            r#"
        {
            "@context": "https://schema.org",
            "@graph": [
                {"@type": "WebPage", "name": "Page"},
                {
                    "@type": ["Recipe", "NewsArticle"],
                    "name": "Lamb Stew",
                    "recipeIngredient": ["1 kg lamb"],
                    "recipeInstructions": ["Stew it"]
                }
            ]
        }
        "#,
        )
        .unwrap();
        assert_eq!(result.title, "Lamb Stew");
        assert_eq!(result.instructions, vec!["Stew it"]);
    }

    #[test]
    fn test_nutrition_and_rating() {
        let result = parse(
            r#"
        {
            "@type": "recipe",
            "name": "Porridge",
            "recipeIngredient": ["1 cup oats"],
            "recipeInstructions": "Simmer",
            "nutrition": {"@type": "NutritionInformation", "calories": "240 calories", "proteinContent": "8 g", "sodiumContent": 120},
            "aggregateRating": {"ratingValue": "4.6", "ratingCount": 132}
        }
        "#,
        )
        .unwrap();

        let nutrition = result.nutrition.unwrap();
        assert_eq!(nutrition.calories.as_deref(), Some("240 calories"));
        assert_eq!(nutrition.protein.as_deref(), Some("8 g"));
        assert_eq!(nutrition.sodium.as_deref(), Some("120"));
        assert_eq!(nutrition.fat, None);
        assert_eq!(
            result.rating,
            Some(Rating {
                value: 4.6,
                count: Some(132)
            })
        );
    }

    #[test]
    fn test_html_entities_decoded() {
        let result = parse(
            r#"{"@type": "Recipe", "name": "Mac &amp;amp; Cheese",
                "recipeIngredient": ["200 g macaroni"], "recipeInstructions": "Boil"}"#,
        )
        .unwrap();
        assert_eq!(result.title, "Mac & Cheese");
    }

    #[test]
    fn test_sanitize_missing_comma() {
        let result = parse(
            r#"{"@type": "Recipe" "name": "Soup", "recipeIngredient": ["1 onion"] "recipeInstructions": "Cook"}"#,
        )
        .unwrap();
        assert_eq!(result.title, "Soup");
        assert_eq!(result.ingredient_lines, vec!["1 onion"]);
    }
}
