use serde::{Deserialize, Serialize};

use crate::dietary::DietaryProfile;
use crate::model::{Ingredient, Product};
use crate::providers::strip_code_fence;

pub const MAX_SUBSTITUTES: usize = 3;

pub const SUBSTITUTE_PROMPT: &str = r#"
You're a culinary expert helping a shopper replace an ingredient. None of the
products the stores offer for it meets the shopper's dietary requirements.
Consider cooking properties, flavour profile, nutritional similarity and cost.
Suggest up to three substitutes, best first, named the way a supermarket
would shelve them. Never suggest the ingredient itself.
Output only this JSON without any other characters:

{
  "suggestions": [{"name": "<SUBSTITUTE>", "reason": "<ONE SENTENCE>"}]
}

"#;

/// What the model gets to see of a product it should avoid
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UnsuitableProduct<'a> {
    name: &'a str,
    brand: &'a str,
    price: f64,
    ingredients: &'a [String],
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct Suggestion {
    pub name: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SubstituteReply {
    Wrapped {
        #[serde(default)]
        suggestions: Vec<Suggestion>,
    },
    List(Vec<Suggestion>),
}

pub(crate) fn substitute_prompt(
    ingredient: &Ingredient,
    profile: &DietaryProfile,
    unsuitable: &[Product],
) -> Result<String, serde_json::Error> {
    let unsuitable: Vec<UnsuitableProduct> = unsuitable
        .iter()
        .map(|p| UnsuitableProduct {
            name: &p.name,
            brand: &p.brand,
            price: p.price,
            ingredients: &p.ingredients_text,
        })
        .collect();

    Ok(format!(
        "{SUBSTITUTE_PROMPT}Ingredient: {}\nDietary requirements: {}\nUnsuitable products: {}\n",
        ingredient.name,
        serde_json::to_string(profile)?,
        serde_json::to_string(&unsuitable)?
    ))
}

/// Clean suggestion names, dropping blanks, repeats and the ingredient itself
pub(crate) fn parse_suggestions(
    reply: &str,
    ingredient: &str,
) -> Result<Vec<Suggestion>, serde_json::Error> {
    let suggestions = match serde_json::from_str(strip_code_fence(reply))? {
        SubstituteReply::Wrapped { suggestions } => suggestions,
        SubstituteReply::List(suggestions) => suggestions,
    };

    let mut seen: Vec<String> = Vec::new();
    Ok(suggestions
        .into_iter()
        .map(|s| Suggestion {
            name: s.name.trim().to_lowercase(),
            reason: s
                .reason
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
        })
        .filter(|s| !s.name.is_empty() && s.name != ingredient)
        .filter(|s| {
            if seen.contains(&s.name) {
                return false;
            }
            seen.push(s.name.clone());
            true
        })
        .take(MAX_SUBSTITUTES)
        .collect())
}
