mod quantity;

use log::warn;
use regex::Regex;
use std::sync::LazyLock;

use crate::error::ParseError;
use crate::model::{Ingredient, Quantity};
use crate::units::UnitTable;

pub use quantity::{locate_amount, AmountToken};

/// Parenthetical content containing one of these words is kept in `notes`
const RELEVANT_TERMS: &[&str] = &[
    "organic",
    "natural",
    "fresh",
    "artificial",
    "color",
    "colour",
    "flavour",
    "flavor",
    "preservative",
    "from",
    "contains",
    "certified",
    "processed",
    "modified",
];

const SIZE_DESCRIPTORS: &[&str] = &["extra-large", "large", "medium", "small", "jumbo", "heaping"];

static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^()]*)\)").expect("parenthetical pattern"));

static SERVING_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i),?\s*\b(?:or\s+)?(to taste|as needed|as required|for garnish|for serving|optional)\b")
        .expect("serving phrase pattern")
});

/// Turns free-text ingredient lines into [`Ingredient`] records.
#[derive(Debug, Clone, Copy)]
pub struct IngredientParser {
    units: &'static UnitTable,
}

impl Default for IngredientParser {
    fn default() -> Self {
        Self::new()
    }
}

impl IngredientParser {
    pub fn new() -> Self {
        IngredientParser {
            units: UnitTable::standard(),
        }
    }

    /// Parse one line.
    ///
    /// Only an explicit fraction with a zero denominator is an error, and the
    /// error still carries the ingredient with its unit and name filled in.
    pub fn parse(&self, text: &str) -> Result<Ingredient, ParseError> {
        let original = text.to_string();
        let lowered = text.trim().to_lowercase();

        let (amount, rest, invalid) = match locate_amount(&lowered, self.units) {
            Some(AmountToken { span, value }) => {
                let rest = format!("{} {}", &lowered[..span.start], &lowered[span.end..]);
                match value {
                    Ok(v) => (Some(v), rest, None),
                    Err(reason) => (None, rest, Some(reason)),
                }
            }
            None => (None, lowered.clone(), None),
        };
        let found_quantity = amount.is_some() || invalid.is_some();

        let mut notes: Vec<String> = Vec::new();

        // Serving phrases first so "to taste" never reaches the name
        let mut serving_notes = Vec::new();
        let rest = SERVING_PHRASE
            .replace_all(&rest, |caps: &regex::Captures| {
                serving_notes.push(caps[1].to_string());
                " "
            })
            .into_owned();

        let mut relevant = Vec::new();
        let rest = PARENTHETICAL
            .replace_all(&rest, |caps: &regex::Captures| {
                let content = caps[1].trim();
                if is_relevant_parenthetical(content) {
                    relevant.push(content.to_string());
                }
                " "
            })
            .into_owned();

        let (rest, unit) = self.take_unit(&rest, found_quantity);

        let (head, tail) = match rest.split_once(',') {
            Some((head, tail)) => (head.to_string(), clean_fragment(tail)),
            None => (rest, String::new()),
        };

        let mut words: Vec<&str> = head.split_whitespace().collect();
        while let Some(first) = words.first() {
            if matches!(*first, "a" | "an" | "of") {
                words.remove(0);
            } else if SIZE_DESCRIPTORS.contains(first) {
                notes.push(first.to_string());
                words.remove(0);
            } else {
                break;
            }
        }
        let name = clean_fragment(&words.join(" "));

        if !tail.is_empty() {
            notes.push(tail);
        }
        notes.extend(relevant);
        notes.extend(serving_notes);

        let ingredient = if name.is_empty() {
            // Nothing usable left: keep the whole line as the name
            Ingredient {
                original: original.clone(),
                name: clean_fragment(&lowered),
                quantity: Quantity::unspecified(),
                notes: None,
            }
        } else {
            Ingredient {
                original: original.clone(),
                name,
                quantity: Quantity { amount, unit },
                notes: if notes.is_empty() {
                    None
                } else {
                    Some(notes.join(", "))
                },
            }
        };

        match invalid {
            Some(reason) => Err(ParseError {
                original,
                reason,
                ingredient,
            }),
            None => Ok(ingredient),
        }
    }

    /// Parse every line, degrading arithmetic errors to an ingredient without
    /// an amount.
    pub fn parse_all<S: AsRef<str>>(&self, lines: &[S]) -> Vec<Ingredient> {
        lines
            .iter()
            .map(|line| {
                self.parse(line.as_ref()).unwrap_or_else(|e| {
                    warn!("{}", e);
                    e.into_ingredient()
                })
            })
            .collect()
    }

    /// Find and remove the first unit word, returning its canonical spelling
    fn take_unit(&self, text: &str, found_quantity: bool) -> (String, Option<String>) {
        let words: Vec<&str> = text.split_whitespace().collect();

        for i in 0..words.len() {
            let candidates = [
                words.get(i + 1).map(|next| (format!("{} {}", words[i], next), 2)),
                Some((words[i].to_string(), 1)),
            ];

            for (phrase, len) in candidates.into_iter().flatten() {
                let Some(def) = self.units.lookup(&phrase) else {
                    continue;
                };
                if def.needs_quantity && !(found_quantity && i == 0) {
                    continue;
                }

                let mut end = i + len;
                if words.get(end) == Some(&"of") {
                    end += 1;
                }
                let remaining = words[..i]
                    .iter()
                    .chain(words[end..].iter())
                    .copied()
                    .collect::<Vec<_>>()
                    .join(" ");
                return (remaining, Some(def.canonical.to_string()));
            }
        }

        (words.join(" "), None)
    }
}

pub(crate) fn is_relevant_parenthetical(content: &str) -> bool {
    content
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| RELEVANT_TERMS.contains(&token))
}

/// Collapse whitespace and trim punctuation from both ends
fn clean_fragment(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_string()
}
