use log::debug;
use scraper::{ElementRef, Html, Node};
use serde::Deserialize;
use std::error::Error;
use std::sync::Arc;

use crate::model::{ExtractedRecipe, RecipeSource};
use crate::providers::{strip_code_fence, CompletionProvider};

pub const RECIPE_EXTRACTION_PROMPT: &str = r#"
You're an expert in finding recipe ingredients and instructions from messy texts.
Sometimes the text is not a recipe, in that case specify that in error field.
Keep every ingredient line as written, including its quantity and unit.
Given the text output only this JSON without any other characters:

{
  "title": "<RECIPE TITLE>",
  "servings": "<SERVINGS IF GIVEN>",
  "prepTime": "<PREP TIME IF GIVEN>",
  "cookTime": "<COOK TIME IF GIVEN>",
  "ingredients": [<LIST OF INGREDIENTS HERE>],
  "instructions": [<LIST OF INSTRUCTIONS HERE>],
  "error": "<ERROR MESSAGE HERE IF NO RECIPE>"
}

Text:
"#;

/// Last-resort stage: sends the visible page text to a completion provider
pub struct CompletionExtractor {
    provider: Arc<dyn CompletionProvider>,
    max_text_chars: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompletionReply {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    servings: Option<String>,
    #[serde(default)]
    prep_time: Option<String>,
    #[serde(default)]
    cook_time: Option<String>,
    #[serde(default)]
    ingredients: Vec<String>,
    #[serde(default)]
    instructions: Vec<String>,
    #[serde(default)]
    error: Option<String>,
}

impl CompletionExtractor {
    pub fn new(provider: Arc<dyn CompletionProvider>, max_text_chars: usize) -> Self {
        CompletionExtractor {
            provider,
            max_text_chars,
        }
    }

    pub fn max_text_chars(&self) -> usize {
        self.max_text_chars
    }

    pub async fn extract(&self, text: &str) -> Result<ExtractedRecipe, Box<dyn Error + Send + Sync>> {
        if text.trim().is_empty() {
            return Err("page has no visible text".into());
        }
        debug!(
            "Sending {} chars to {}",
            text.chars().count(),
            self.provider.provider_name()
        );
        let prompt = format!("{RECIPE_EXTRACTION_PROMPT}{text}");
        let reply = self.provider.complete(&prompt).await?;
        parse_reply(&reply)
    }
}

/// Parse the provider reply, tolerating a surrounding code fence
fn parse_reply(reply: &str) -> Result<ExtractedRecipe, Box<dyn Error + Send + Sync>> {
    let reply: CompletionReply = serde_json::from_str(strip_code_fence(reply))?;

    if let Some(error) = reply.error.as_deref().map(str::trim) {
        if !error.is_empty() {
            return Err(error.into());
        }
    }

    let clean = |items: Vec<String>| -> Vec<String> {
        items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    };
    let present = |value: Option<String>| value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let mut recipe = ExtractedRecipe::empty(RecipeSource::Ai);
    recipe.ingredient_lines = clean(reply.ingredients);
    recipe.instructions = clean(reply.instructions);
    if recipe.ingredient_lines.is_empty() || recipe.instructions.is_empty() {
        return Err("completion reply has no ingredients or instructions".into());
    }

    recipe.title = present(reply.title).unwrap_or_default();
    recipe.servings = present(reply.servings);
    recipe.prep_time = present(reply.prep_time);
    recipe.cook_time = present(reply.cook_time);
    Ok(recipe)
}

/// Readable page text, one line per block element, at most `max_chars`
/// characters
pub fn visible_text(document: &Html, max_chars: usize) -> String {
    let mut pieces = Vec::new();
    collect_text(&document.root_element(), &mut pieces);

    let mut lines = Vec::new();
    let mut current: Vec<String> = Vec::new();
    for piece in pieces {
        match piece {
            Piece::Text(text) => current.push(text),
            Piece::Break => {
                if !current.is_empty() {
                    lines.push(current.join(" "));
                    current.clear();
                }
            }
        }
    }
    if !current.is_empty() {
        lines.push(current.join(" "));
    }

    let text = lines.join("\n");
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => text[..end].to_string(),
        None => text,
    }
}

enum Piece {
    Text(String),
    Break,
}

fn collect_text(element: &ElementRef, pieces: &mut Vec<Piece>) {
    if is_hidden(element) || should_skip_element(element) || is_advertisement(element) {
        return;
    }

    let tag_name = element.value().name().to_lowercase();
    if tag_name == "br" {
        pieces.push(Piece::Break);
        return;
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let normalized = normalize_whitespace(text);
                if !normalized.is_empty() {
                    pieces.push(Piece::Text(normalized));
                }
            }
            Node::Element(_) => {
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_text(&child_ref, pieces);
                }
            }
            _ => {}
        }
    }

    if is_block_element(&tag_name) {
        pieces.push(Piece::Break);
    }
}

fn is_hidden(element: &ElementRef) -> bool {
    let value = element.value();
    value.attr("hidden").is_some()
        || value.attr("aria-hidden") == Some("true")
        || value.attr("style").is_some_and(|style| {
            let style = style.replace(' ', "").to_lowercase();
            style.contains("display:none") || style.contains("visibility:hidden")
        })
}

fn should_skip_element(element: &ElementRef) -> bool {
    matches!(
        element.value().name(),
        "script"
            | "style"
            | "noscript"
            | "iframe"
            | "canvas"
            | "svg"
            | "nav"
            | "header"
            | "footer"
            | "template"
            | "head"
    )
}

fn is_advertisement(element: &ElementRef) -> bool {
    element.value().classes().any(|class| {
        matches!(class, "ad" | "ads" | "advert" | "advertisement" | "sponsored")
            || class.starts_with("ad-")
            || class.starts_with("ads-")
    })
}

fn is_block_element(tag: &str) -> bool {
    matches!(
        tag,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "dd"
            | "div"
            | "dl"
            | "dt"
            | "figcaption"
            | "figure"
            | "form"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "hr"
            | "li"
            | "main"
            | "ol"
            | "p"
            | "pre"
            | "section"
            | "table"
            | "td"
            | "th"
            | "tr"
            | "ul"
    )
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct CannedProvider {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CompletionProvider for CannedProvider {
        fn provider_name(&self) -> &str {
            "canned"
        }

        async fn complete(&self, prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    fn canned(reply: &str) -> Arc<CannedProvider> {
        Arc::new(CannedProvider {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        })
    }

    #[test]
    fn test_visible_text_skips_chrome_and_hidden() {
        let document = Html::parse_document(
            r#"<html><head><title>T</title><style>p{}</style></head><body>
            <header>Site header</header>
            <nav>Home | Recipes</nav>
            <div class="ad">Buy now</div>
            <div style="display: none">Hidden</div>
            <h1>Pancakes</h1>
            <p>2 eggs<br>1 cup milk</p>
            <script>var x = 1;</script>
            <footer>Copyright</footer>
            </body></html>"#,
        );
        assert_eq!(visible_text(&document, 4000), "Pancakes\n2 eggs\n1 cup milk");
    }

    #[test]
    fn test_visible_text_truncates_on_char_boundary() {
        let document = Html::parse_document("<p>crème brûlée</p>");
        assert_eq!(visible_text(&document, 4), "crèm");
    }

    #[test]
    fn test_parse_reply_with_code_fence() {
        let recipe = parse_reply(
            "```json\n{\"title\": \"Pancakes\", \"ingredients\": [\"2 eggs\"], \"instructions\": [\"Whisk\"], \"error\": \"\"}\n```",
        )
        .unwrap();
        assert_eq!(recipe.source, RecipeSource::Ai);
        assert_eq!(recipe.title, "Pancakes");
        assert_eq!(recipe.ingredient_lines, vec!["2 eggs"]);
    }

    #[test]
    fn test_parse_reply_failures() {
        assert!(parse_reply("not json at all").is_err());
        assert!(parse_reply(r#"{"ingredients": [], "instructions": [], "error": "Not a recipe"}"#).is_err());
        assert!(parse_reply(r#"{"ingredients": ["1 egg"], "instructions": []}"#).is_err());
    }

    #[tokio::test]
    async fn test_extract_sends_prompt_and_text() {
        let provider = canned(r#"{"ingredients": ["1 egg"], "instructions": ["Fry it"]}"#);
        let extractor = CompletionExtractor::new(provider.clone(), 4000);
        let recipe = extractor.extract("Fried egg\n1 egg").await.unwrap();

        assert_eq!(recipe.instructions, vec!["Fry it"]);
        let prompts = provider.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].starts_with(RECIPE_EXTRACTION_PROMPT));
        assert!(prompts[0].ends_with("Fried egg\n1 egg"));
    }

    #[tokio::test]
    async fn test_empty_text_skips_provider() {
        let provider = canned("{}");
        let extractor = CompletionExtractor::new(provider.clone(), 4000);
        assert!(extractor.extract("   ").await.is_err());
        assert!(provider.prompts.lock().unwrap().is_empty());
    }
}
