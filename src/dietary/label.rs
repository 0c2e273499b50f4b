use regex::Regex;
use std::sync::LazyLock;

use crate::ingredients::is_relevant_parenthetical;

// A section runs to the first full stop followed by whitespace, so decimals
// such as "2.5%" stay inside it.
static INGREDIENTS_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\bingredients?\s*:\s*(.+?)(?:\.(?:\s|$)|$)").expect("ingredients pattern")
});

static CONTAINS_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(?:^|[^y]\s)contains\s*:\s*(.+?)(?:\.(?:\s|$)|$)").expect("contains pattern")
});

static ADVISORY_SECTIONS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"may contain(?: traces of)?",
        r"allergen warning",
        r"produced in a facility that (?:also )?processes",
        r"manufactured on (?:shared )?equipment that (?:also )?processes",
    ]
    .iter()
    .map(|lead| {
        Regex::new(&format!(r"(?is)\b{lead}\s*:?\s*(.+?)(?:\.(?:\s|$)|$)"))
            .expect("advisory pattern")
    })
    .collect()
});

/// A product label split into the lists compliance checks read
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductLabel {
    pub ingredients: Vec<String>,
    pub allergen_warnings: Vec<String>,
}

/// Parses free-text product labels such as
/// `"Ingredients: Wheat Flour, Sugar (Organic). Contains: Gluten. May contain: Peanuts."`
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelAnalyzer;

impl LabelAnalyzer {
    pub fn analyze(&self, label: &str) -> ProductLabel {
        let mut ingredients = INGREDIENTS_SECTION
            .captures(label)
            .map(|caps| split_ingredient_list(&caps[1]))
            .unwrap_or_default();

        // A "Contains:" statement lists allergens present in the product
        if let Some(caps) = CONTAINS_SECTION.captures(label) {
            for item in split_ingredient_list(&caps[1]) {
                if !ingredients.contains(&item) {
                    ingredients.push(item);
                }
            }
        }

        let mut allergen_warnings = Vec::new();
        for pattern in ADVISORY_SECTIONS.iter() {
            for caps in pattern.captures_iter(label) {
                for item in split_ingredient_list(&caps[1]) {
                    if !allergen_warnings.contains(&item) {
                        allergen_warnings.push(item);
                    }
                }
            }
        }

        ProductLabel {
            ingredients,
            allergen_warnings,
        }
    }
}

/// Split on `,`, `;`, `•` and `|` outside parentheses. Parenthetical
/// sub-ingredients become their own entries unless they are a relevant
/// qualifier such as "(organic)", which stays attached.
pub fn split_ingredient_list(list: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for c in list.chars() {
        match c {
            '(' | '[' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' | ';' | '•' | '|' if depth == 0 => {
                push_item(&mut items, &current);
                current.clear();
            }
            _ => current.push(c),
        }
    }
    push_item(&mut items, &current);
    items
}

fn push_item(items: &mut Vec<String>, raw: &str) {
    let raw = raw.trim();
    if raw.is_empty() {
        return;
    }

    let mut base = String::new();
    let mut qualifiers = Vec::new();
    let mut nested = Vec::new();
    let mut rest = raw;

    while let Some(open) = rest.find(['(', '[']) {
        base.push_str(&rest[..open]);
        let inner_start = open + 1;
        let Some(close) = matching_close(&rest[inner_start..]) else {
            base.push_str(&rest[open..]);
            rest = "";
            break;
        };
        let inner = rest[inner_start..inner_start + close].trim();
        if is_relevant_parenthetical(inner) && !inner.contains([',', ';']) {
            qualifiers.push(inner.to_lowercase());
        } else {
            nested.extend(split_ingredient_list(inner));
        }
        rest = &rest[inner_start + close + 1..];
    }
    base.push_str(rest);

    // Bare percentages and codes are not ingredients
    let base = normalize(&base);
    if base.chars().any(char::is_alphabetic) {
        if qualifiers.is_empty() {
            items.push(base);
        } else {
            items.push(format!("{} ({})", base, qualifiers.join(", ")));
        }
    }
    items.extend(nested);
}

fn matching_close(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' if depth == 0 => return Some(i),
            ')' | ']' => depth -= 1,
            _ => {}
        }
    }
    None
}

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c == '.' || c == '*' || c == ':' || c.is_whitespace())
        .to_lowercase()
}
