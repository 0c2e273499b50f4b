//! Dietary profiles and the rules products are checked against.

mod compliance;
mod label;
mod profile;
mod rules;

pub use compliance::{ComplianceChecker, ComplianceResult, NO_INGREDIENT_INFORMATION};
pub use label::{split_ingredient_list, LabelAnalyzer, ProductLabel};
pub use profile::{Allergen, AvoidIngredient, Diet, DietaryProfile, Preference, Severity};
pub use rules::{DietaryRuleSet, PreferenceRule};
