use super::{convert_duration, element_text, Extractor, ParsingContext};
use crate::model::{ExtractedRecipe, RecipeSource};
use log::debug;
use scraper::{ElementRef, Html, Selector};

pub struct MicroDataExtractor;

impl MicroDataExtractor {
    fn find_recipe_container<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        let selector = Selector::parse("[itemscope]").expect("valid selector");
        document.select(&selector).find(|element| {
            element.value().attr("itemtype").is_some_and(|itemtype| {
                itemtype.contains("schema.org/Recipe")
                    || itemtype.contains("data-vocabulary.org/Recipe")
            })
        })
    }

    /// Elements carrying `prop` that belong to `root` itself, not to a
    /// nested item such as the author or a review
    fn props<'a>(&self, root: ElementRef<'a>, prop: &str) -> Vec<ElementRef<'a>> {
        let Ok(selector) = Selector::parse(&format!("[itemprop='{prop}']")) else {
            return Vec::new();
        };
        root.select(&selector)
            .filter(|el| {
                el.ancestors()
                    .filter_map(ElementRef::wrap)
                    .find(|a| a.value().attr("itemscope").is_some())
                    .is_some_and(|owner| owner.id() == root.id())
            })
            .collect()
    }

    fn get_itemprop(&self, root: ElementRef, prop: &str) -> Option<String> {
        self.props(root, prop)
            .into_iter()
            .map(|el| element_text(&el))
            .find(|text| !text.is_empty())
    }

    fn get_itemprop_list(&self, root: ElementRef, prop: &str) -> Vec<String> {
        self.props(root, prop)
            .into_iter()
            .map(|el| element_text(&el))
            .filter(|text| !text.is_empty())
            .collect()
    }

    /// Times are usually in a `content` or `datetime` attribute as ISO 8601,
    /// with human text in the element body
    fn get_time(&self, root: ElementRef, prop: &str) -> Option<String> {
        let el = self.props(root, prop).into_iter().next()?;
        let value = el.value();
        match value.attr("content").or_else(|| value.attr("datetime")) {
            Some(iso) if !iso.trim().is_empty() => Some(convert_duration(iso.trim())),
            _ => Some(element_text(&el)).filter(|text| !text.is_empty()),
        }
    }

    fn get_image(&self, root: ElementRef) -> Option<String> {
        let el = self.props(root, "image").into_iter().next()?;
        let value = el.value();
        value
            .attr("src")
            .or_else(|| value.attr("content"))
            .or_else(|| value.attr("href"))
            .map(str::to_string)
            .or_else(|| Some(element_text(&el)))
            .filter(|text| !text.is_empty())
    }

    fn get_author(&self, root: ElementRef) -> Option<String> {
        let author = self.props(root, "author").into_iter().next()?;
        // A Person item carries its own name, otherwise use the element text
        let name_selector = Selector::parse("[itemprop='name']").expect("valid selector");
        let target = author.select(&name_selector).next().unwrap_or(author);
        Some(element_text(&target)).filter(|text| !text.is_empty())
    }
}

impl Extractor for MicroDataExtractor {
    fn name(&self) -> &'static str {
        "microdata"
    }

    fn parse(&self, context: &ParsingContext) -> Result<ExtractedRecipe, Box<dyn std::error::Error>> {
        debug!("Attempting to extract recipe using MicroData extractor");

        // Unscoped itemprop lookups pick up site titles and author bios
        let container = self
            .find_recipe_container(&context.document)
            .ok_or("No MicroData Recipe container found")?;

        let mut recipe = ExtractedRecipe::empty(RecipeSource::Microdata);
        recipe.title = self
            .get_itemprop(container, "name")
            .ok_or("Could not extract recipe name")?;
        recipe.description = self.get_itemprop(container, "description");
        recipe.image = self.get_image(container);
        recipe.author = self.get_author(container);
        recipe.prep_time = self.get_time(container, "prepTime");
        recipe.cook_time = self.get_time(container, "cookTime");
        recipe.total_time = self.get_time(container, "totalTime");
        recipe.servings = self.get_itemprop(container, "recipeYield");
        recipe.category = self.get_itemprop_list(container, "recipeCategory");
        recipe.cuisine = self.get_itemprop_list(container, "recipeCuisine");
        recipe.tags = self
            .get_itemprop(container, "keywords")
            .map(|keywords| {
                keywords
                    .split(',')
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        recipe.ingredient_lines = self.get_itemprop_list(container, "recipeIngredient");
        if recipe.ingredient_lines.is_empty() {
            recipe.ingredient_lines = self.get_itemprop_list(container, "ingredients");
        }

        recipe.instructions = self.get_itemprop_list(container, "recipeInstructions");
        if recipe.instructions.is_empty() {
            recipe.instructions = self.get_itemprop_list(container, "instructions");
        }

        if recipe.ingredient_lines.is_empty() || recipe.instructions.is_empty() {
            return Err("Could not extract recipe content".into());
        }

        let has_detail = recipe.image.is_some()
            || recipe.prep_time.is_some()
            || recipe.cook_time.is_some()
            || recipe.total_time.is_some();
        if !has_detail {
            return Err("MicroData recipe has no image or timing".into());
        }

        Ok(recipe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawPage;

    fn parse(html: &str) -> Result<ExtractedRecipe, Box<dyn std::error::Error>> {
        let page = RawPage::new("https://example.com/recipe", html);
        MicroDataExtractor.parse(&ParsingContext::new(&page))
    }

    const FULL: &str = r#"
        <html><body>
        <header><span itemprop="name">Site Name</span></header>
        <div itemscope itemtype="https://schema.org/Recipe">
            <div itemprop="author" itemscope itemtype="https://schema.org/Person">
                <span itemprop="name">Ana Cook</span>
            </div>
            <h1 itemprop="name">Banana Bread</h1>
            <img itemprop="image" src="https://example.com/bread.jpg">
            <meta itemprop="prepTime" content="PT15M">
            <time itemprop="cookTime" datetime="PT1H">1 hour</time>
            <span itemprop="recipeYield">1 loaf</span>
            <ul>
                <li itemprop="recipeIngredient">3 ripe bananas</li>
                <li itemprop="recipeIngredient">2 cups flour</li>
            </ul>
            <ol>
                <li itemprop="recipeInstructions">Mash the bananas.</li>
                <li itemprop="recipeInstructions">Fold in flour and bake.</li>
            </ol>
        </div>
        </body></html>
    "#;

    #[test]
    fn test_full_microdata() {
        let recipe = parse(FULL).unwrap();
        assert_eq!(recipe.source, RecipeSource::Microdata);
        assert_eq!(recipe.title, "Banana Bread");
        assert_eq!(recipe.author.as_deref(), Some("Ana Cook"));
        assert_eq!(recipe.image.as_deref(), Some("https://example.com/bread.jpg"));
        assert_eq!(recipe.prep_time.as_deref(), Some("15 minutes"));
        assert_eq!(recipe.cook_time.as_deref(), Some("1 hour"));
        assert_eq!(recipe.servings.as_deref(), Some("1 loaf"));
        assert_eq!(recipe.ingredient_lines, vec!["3 ripe bananas", "2 cups flour"]);
        assert_eq!(
            recipe.instructions,
            vec!["Mash the bananas.", "Fold in flour and bake."]
        );
    }

    #[test]
    fn test_requires_container() {
        let html = r#"<div><span itemprop="name">Loose</span>
            <li itemprop="recipeIngredient">1 egg</li></div>"#;
        assert!(parse(html).is_err());
    }

    #[test]
    fn test_requires_image_or_time() {
        let html = r#"
            <div itemscope itemtype="http://schema.org/Recipe">
                <h1 itemprop="name">Toast</h1>
                <li itemprop="recipeIngredient">1 slice bread</li>
                <li itemprop="recipeInstructions">Toast it.</li>
            </div>"#;
        assert!(parse(html).is_err());
    }

    #[test]
    fn test_requires_ingredients_and_instructions() {
        let html = r#"
            <div itemscope itemtype="http://schema.org/Recipe">
                <h1 itemprop="name">Toast</h1>
                <meta itemprop="totalTime" content="PT5M">
                <li itemprop="recipeIngredient">1 slice bread</li>
            </div>"#;
        assert!(parse(html).is_err());
    }
}
