use std::collections::HashMap;
use std::sync::LazyLock;

use super::profile::{Diet, Preference};

const VEGETARIAN: &[&str] = &[
    "meat",
    "beef",
    "chicken",
    "pork",
    "gelatin",
    "lard",
    "animal fat",
    "animal shortening",
];

const VEGAN: &[&str] = &[
    "meat", "milk", "egg", "honey", "gelatin", "whey", "casein", "lactose", "animal", "butter",
    "cream",
];

const PESCATARIAN: &[&str] = &[
    "meat", "beef", "chicken", "pork", "lamb", "turkey", "gelatin", "lard",
];

const GLUTEN_FREE: &[&str] = &[
    "wheat",
    "barley",
    "rye",
    "malt",
    "oats",
    "flour",
    "bread crumbs",
    "semolina",
    "spelt",
    "triticale",
];

const DAIRY_FREE: &[&str] = &[
    "milk", "cream", "cheese", "butter", "whey", "casein", "lactose", "yogurt", "dairy",
];

/// Extra spellings an allergen is also matched by, keyed by the allergen name
const ALLERGEN_ALIASES: &[(&str, &[&str])] = &[
    ("milk", &["milk", "cream", "butter", "cheese", "whey", "casein", "lactose", "yogurt"]),
    ("dairy", &["milk", "cream", "butter", "cheese", "whey", "casein", "lactose", "yogurt"]),
    ("eggs", &["egg", "albumen"]),
    ("egg", &["egg", "albumen"]),
    ("peanuts", &["peanut"]),
    (
        "tree nuts",
        &["almond", "cashew", "walnut", "pecan", "hazelnut", "pistachio", "macadamia", "brazil nut"],
    ),
    ("shellfish", &["shrimp", "prawn", "crab", "lobster", "mussel", "oyster", "clam", "scallop"]),
    ("fish", &["anchovy", "salmon", "tuna", "cod"]),
    ("wheat", &["wheat", "spelt", "semolina"]),
    ("gluten", &["wheat", "barley", "rye", "spelt", "malt"]),
    ("soybeans", &["soy", "soya", "tofu"]),
    ("soy", &["soya", "tofu"]),
    ("sesame", &["tahini"]),
    ("sulphites", &["sulphite", "sulfite", "sulphur dioxide", "sulfur dioxide"]),
];

/// What a preference looks for in an ingredient list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceRule {
    /// Warn unless some ingredient mentions a keyword
    Requires {
        keywords: &'static [&'static str],
        message: &'static str,
    },
    /// Warn when an ingredient mentions a keyword, ignoring ingredients that
    /// mention an exception ("non-gmo" is not "gmo")
    Forbids {
        keywords: &'static [&'static str],
        except: &'static [&'static str],
        message: &'static str,
    },
}

impl PreferenceRule {
    /// Warning message if `ingredients` (lowercased) violate the rule
    pub fn violation(&self, ingredients: &[String]) -> Option<&'static str> {
        match self {
            PreferenceRule::Requires { keywords, message } => {
                let satisfied = ingredients
                    .iter()
                    .any(|i| keywords.iter().any(|k| i.contains(k)));
                (!satisfied).then_some(*message)
            }
            PreferenceRule::Forbids {
                keywords,
                except,
                message,
            } => {
                let violated = ingredients
                    .iter()
                    .filter(|i| !except.iter().any(|e| i.contains(e)))
                    .any(|i| keywords.iter().any(|k| i.contains(k)));
                violated.then_some(*message)
            }
        }
    }
}

/// Immutable keyword tables for diets, allergens and preferences
#[derive(Debug)]
pub struct DietaryRuleSet {
    diets: HashMap<Diet, &'static [&'static str]>,
    allergen_aliases: HashMap<&'static str, &'static [&'static str]>,
    preferences: HashMap<Preference, PreferenceRule>,
}

static STANDARD_RULES: LazyLock<DietaryRuleSet> = LazyLock::new(DietaryRuleSet::build);

impl DietaryRuleSet {
    fn build() -> Self {
        let diets = HashMap::from([
            (Diet::Vegetarian, VEGETARIAN),
            (Diet::Vegan, VEGAN),
            (Diet::Pescatarian, PESCATARIAN),
            (Diet::GlutenFree, GLUTEN_FREE),
            (Diet::DairyFree, DAIRY_FREE),
        ]);

        let preferences = HashMap::from([
            (
                Preference::Organic,
                PreferenceRule::Requires {
                    keywords: &["organic"],
                    message: "Not organic",
                },
            ),
            (
                Preference::NonGmo,
                PreferenceRule::Forbids {
                    keywords: &["genetically modified", "gmo"],
                    except: &["non-gmo", "non gmo", "gmo-free", "gmo free"],
                    message: "Contains GMO ingredients",
                },
            ),
            (
                Preference::NoArtificialColors,
                PreferenceRule::Forbids {
                    keywords: &["artificial color", "artificial colour", "fd&c", "food coloring"],
                    except: &[],
                    message: "Contains artificial colors",
                },
            ),
            (
                Preference::NoArtificialFlavors,
                PreferenceRule::Forbids {
                    keywords: &["artificial flavor", "artificial flavour"],
                    except: &[],
                    message: "Contains artificial flavors",
                },
            ),
            (
                Preference::NoPreservatives,
                PreferenceRule::Forbids {
                    keywords: &[
                        "sodium benzoate",
                        "potassium sorbate",
                        "bht",
                        "bha",
                        "sulfite",
                        "nitrite",
                        "nitrate",
                    ],
                    except: &[],
                    message: "Contains preservatives",
                },
            ),
        ]);

        DietaryRuleSet {
            diets,
            allergen_aliases: ALLERGEN_ALIASES.iter().copied().collect(),
            preferences,
        }
    }

    pub fn standard() -> &'static DietaryRuleSet {
        &STANDARD_RULES
    }

    /// Forbidden keywords for a diet, `None` for diets without a table
    pub fn forbidden_for(&self, diet: Diet) -> Option<&'static [&'static str]> {
        self.diets.get(&diet).copied()
    }

    /// The allergen name plus every alias, lowercased and deduplicated
    pub fn allergen_terms(&self, allergen: &str) -> Vec<String> {
        let name = allergen.trim().to_lowercase();
        let mut terms = vec![name.clone()];
        if let Some(aliases) = self.allergen_aliases.get(name.as_str()) {
            for alias in aliases.iter() {
                if !terms.iter().any(|t| t == alias) {
                    terms.push(alias.to_string());
                }
            }
        }
        terms
    }

    pub fn preference_rule(&self, preference: Preference) -> Option<&PreferenceRule> {
        self.preferences.get(&preference)
    }
}
