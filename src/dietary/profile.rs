use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Diet {
    #[default]
    None,
    Vegetarian,
    Vegan,
    Pescatarian,
    Kosher,
    Halal,
    GlutenFree,
    DairyFree,
    Keto,
    Paleo,
}

impl Diet {
    pub fn as_str(&self) -> &'static str {
        match self {
            Diet::None => "none",
            Diet::Vegetarian => "vegetarian",
            Diet::Vegan => "vegan",
            Diet::Pescatarian => "pescatarian",
            Diet::Kosher => "kosher",
            Diet::Halal => "halal",
            Diet::GlutenFree => "gluten-free",
            Diet::DairyFree => "dairy-free",
            Diet::Keto => "keto",
            Diet::Paleo => "paleo",
        }
    }
}

/// How an allergen match is treated. `Strict` and `Cautious` exclude products
/// on an advisory "may contain" match, `Preference` only warns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Strict,
    Cautious,
    Preference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preference {
    Organic,
    NonGmo,
    NoArtificialColors,
    NoArtificialFlavors,
    NoPreservatives,
    LowSodium,
    LowSugar,
    LowFat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allergen {
    pub name: String,
    #[serde(default)]
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvoidIngredient {
    pub ingredient: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// A shopper's dietary requirements, supplied per matching request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietaryProfile {
    #[serde(default)]
    pub diet: Diet,
    #[serde(default)]
    pub allergens: Vec<Allergen>,
    #[serde(default)]
    pub avoid_ingredients: Vec<AvoidIngredient>,
    #[serde(default)]
    pub preferences: Vec<Preference>,
}

impl DietaryProfile {
    pub fn with_diet(diet: Diet) -> Self {
        DietaryProfile {
            diet,
            ..Default::default()
        }
    }

    pub fn allergen(mut self, name: impl Into<String>, severity: Severity) -> Self {
        self.allergens.push(Allergen {
            name: name.into(),
            severity,
        });
        self
    }

    pub fn avoid(mut self, ingredient: impl Into<String>, reason: Option<&str>) -> Self {
        self.avoid_ingredients.push(AvoidIngredient {
            ingredient: ingredient.into(),
            reason: reason.map(str::to_string),
        });
        self
    }

    pub fn prefer(mut self, preference: Preference) -> Self {
        self.preferences.push(preference);
        self
    }
}
