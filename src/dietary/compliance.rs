use log::debug;
use serde::{Deserialize, Serialize};

use super::profile::{DietaryProfile, Severity};
use super::rules::DietaryRuleSet;
use crate::model::Product;

pub const NO_INGREDIENT_INFORMATION: &str = "no ingredient information available";

/// Verdict for one (product, profile) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceResult {
    pub safe: bool,
    pub warnings: Vec<String>,
    pub incompatible_reasons: Vec<String>,
}

impl Default for ComplianceResult {
    fn default() -> Self {
        ComplianceResult {
            safe: true,
            warnings: Vec::new(),
            incompatible_reasons: Vec::new(),
        }
    }
}

impl ComplianceResult {
    fn reject(&mut self, reason: String) {
        self.safe = false;
        self.incompatible_reasons.push(reason);
    }
}

/// Evaluates products against a [`DietaryProfile`]. Every rule runs, so the
/// reasons list is complete even after the first failure.
#[derive(Debug, Clone, Copy)]
pub struct ComplianceChecker {
    rules: &'static DietaryRuleSet,
}

impl Default for ComplianceChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl ComplianceChecker {
    pub fn new() -> Self {
        ComplianceChecker {
            rules: DietaryRuleSet::standard(),
        }
    }

    pub fn check(&self, product: &Product, profile: &DietaryProfile) -> ComplianceResult {
        let mut result = ComplianceResult::default();

        let ingredients: Vec<String> = product
            .ingredients_text
            .iter()
            .map(|i| i.trim().to_lowercase())
            .filter(|i| !i.is_empty())
            .collect();
        let warnings: Vec<String> = product
            .allergen_warnings
            .iter()
            .map(|w| w.to_lowercase())
            .collect();

        if ingredients.is_empty() {
            result.reject(NO_INGREDIENT_INFORMATION.to_string());
        }

        if let Some(forbidden) = self.rules.forbidden_for(profile.diet) {
            let hits: Vec<&str> = ingredients
                .iter()
                .filter(|i| forbidden.iter().any(|k| i.contains(k)))
                .map(String::as_str)
                .collect();
            if !hits.is_empty() {
                result.reject(format!(
                    "Not suitable for {} diet: {}",
                    profile.diet.as_str(),
                    hits.join(", ")
                ));
            }
        }

        for allergen in &profile.allergens {
            let terms = self.rules.allergen_terms(&allergen.name);
            let mentions = |texts: &[String]| {
                texts
                    .iter()
                    .any(|text| terms.iter().any(|t| text.contains(t.as_str())))
            };

            if mentions(&ingredients) {
                result.reject(format!("Contains allergen: {}", allergen.name));
            } else if mentions(&warnings) {
                let message = format!("May contain allergen: {}", allergen.name);
                match allergen.severity {
                    Severity::Preference => result.warnings.push(message),
                    Severity::Strict | Severity::Cautious => result.reject(message),
                }
            }
        }

        for avoid in &profile.avoid_ingredients {
            let term = avoid.ingredient.trim().to_lowercase();
            if term.is_empty() || !ingredients.iter().any(|i| i.contains(&term)) {
                continue;
            }
            let reason = match avoid.reason.as_deref().filter(|r| !r.trim().is_empty()) {
                Some(why) => format!("Contains avoided ingredient: {} ({})", avoid.ingredient, why),
                None => format!("Contains avoided ingredient: {}", avoid.ingredient),
            };
            result.reject(reason);
        }

        for preference in &profile.preferences {
            match self.rules.preference_rule(*preference) {
                Some(rule) => {
                    if let Some(message) = rule.violation(&ingredients) {
                        result.warnings.push(message.to_string());
                    }
                }
                None => debug!("No rule for preference {:?}", preference),
            }
        }

        if !result.safe {
            debug!(
                "{} ({}) rejected: {}",
                product.name,
                product.store,
                result.incompatible_reasons.join("; ")
            );
        }
        result
    }
}
