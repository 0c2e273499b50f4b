mod conversion;

pub use conversion::{convert, ConversionGraph, ConversionRatio};

use std::collections::HashMap;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Volume,
    Weight,
    Length,
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasureSystem {
    Metric,
    Imperial,
    Neutral,
}

#[derive(Debug, Clone)]
pub struct UnitDef {
    pub canonical: &'static str,
    pub dimension: Dimension,
    pub system: MeasureSystem,
    pub synonyms: &'static [&'static str],
    /// Words like "in" or "can" that are only a unit right after a quantity
    pub needs_quantity: bool,
}

const fn unit(
    canonical: &'static str,
    dimension: Dimension,
    system: MeasureSystem,
    synonyms: &'static [&'static str],
) -> UnitDef {
    UnitDef {
        canonical,
        dimension,
        system,
        synonyms,
        needs_quantity: false,
    }
}

const fn ambiguous(
    canonical: &'static str,
    dimension: Dimension,
    system: MeasureSystem,
    synonyms: &'static [&'static str],
) -> UnitDef {
    UnitDef {
        canonical,
        dimension,
        system,
        synonyms,
        needs_quantity: true,
    }
}

use Dimension::*;
use MeasureSystem::*;

const UNITS: &[UnitDef] = &[
    // volume
    unit("ml", Volume, Metric, &["ml", "mls", "milliliter", "milliliters", "millilitre", "millilitres"]),
    unit("l", Volume, Metric, &["l", "liter", "liters", "litre", "litres"]),
    unit("tsp", Volume, Imperial, &["tsp", "tsps", "teaspoon", "teaspoons"]),
    unit("tbsp", Volume, Imperial, &["tbsp", "tbsps", "tbs", "tbl", "tablespoon", "tablespoons"]),
    unit("cup", Volume, Imperial, &["cup", "cups"]),
    unit("fl oz", Volume, Imperial, &["fl oz", "fl. oz", "floz", "fluid ounce", "fluid ounces"]),
    unit("pint", Volume, Imperial, &["pint", "pints", "pt"]),
    unit("quart", Volume, Imperial, &["quart", "quarts", "qt"]),
    unit("gallon", Volume, Imperial, &["gallon", "gallons", "gal"]),
    // weight
    unit("mg", Weight, Metric, &["mg", "milligram", "milligrams"]),
    unit("g", Weight, Metric, &["g", "gram", "grams", "gm", "gms"]),
    unit("kg", Weight, Metric, &["kg", "kgs", "kilo", "kilos", "kilogram", "kilograms"]),
    unit("oz", Weight, Imperial, &["oz", "ounce", "ounces"]),
    unit("lb", Weight, Imperial, &["lb", "lbs", "pound", "pounds"]),
    // length
    unit("mm", Length, Metric, &["mm", "millimeter", "millimeters", "millimetre", "millimetres"]),
    unit("cm", Length, Metric, &["cm", "centimeter", "centimeters", "centimetre", "centimetres"]),
    ambiguous("m", Length, Metric, &["m", "meter", "meters", "metre", "metres"]),
    ambiguous("in", Length, Imperial, &["in", "inch", "inches"]),
    unit("ft", Length, Imperial, &["ft", "foot", "feet"]),
    // count
    ambiguous("whole", Count, Neutral, &["whole"]),
    unit("piece", Count, Neutral, &["piece", "pieces", "pc", "pcs"]),
    unit("slice", Count, Neutral, &["slice", "slices"]),
    unit("bunch", Count, Neutral, &["bunch", "bunches"]),
    unit("clove", Count, Neutral, &["clove", "cloves"]),
    ambiguous("can", Count, Neutral, &["can", "cans", "tin", "tins"]),
    unit("pinch", Count, Neutral, &["pinch", "pinches"]),
    unit("dash", Count, Neutral, &["dash", "dashes"]),
    unit("sprig", Count, Neutral, &["sprig", "sprigs"]),
];

/// Fraction words and their decimal values
const FRACTION_WORDS: &[(&str, f64)] = &[
    ("half", 0.5),
    ("quarter", 0.25),
    ("third", 1.0 / 3.0),
    ("fourth", 0.25),
    ("eighth", 0.125),
    ("three-quarters", 0.75),
    ("three quarters", 0.75),
    ("two-thirds", 2.0 / 3.0),
    ("two thirds", 2.0 / 3.0),
    ("one-half", 0.5),
    ("one half", 0.5),
    ("one-quarter", 0.25),
    ("one-third", 1.0 / 3.0),
    ("one-fourth", 0.25),
    ("one-eighth", 0.125),
];

/// Static registry of unit synonyms and fraction words, built once per process.
#[derive(Debug)]
pub struct UnitTable {
    units: &'static [UnitDef],
    synonyms: HashMap<&'static str, usize>,
    fraction_words: Vec<(&'static str, f64)>,
}

static STANDARD_UNITS: LazyLock<UnitTable> = LazyLock::new(|| UnitTable::new(UNITS, FRACTION_WORDS));

impl UnitTable {
    fn new(units: &'static [UnitDef], fraction_words: &[(&'static str, f64)]) -> Self {
        let mut synonyms = HashMap::new();
        for (index, def) in units.iter().enumerate() {
            for synonym in def.synonyms {
                synonyms.insert(*synonym, index);
            }
        }

        // Longest first so "three-quarters" wins over "quarter"
        let mut fraction_words = fraction_words.to_vec();
        fraction_words.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        UnitTable {
            units,
            synonyms,
            fraction_words,
        }
    }

    pub fn standard() -> &'static UnitTable {
        &STANDARD_UNITS
    }

    /// Find the unit a word (or two-word phrase) names, ignoring case and
    /// trailing punctuation.
    pub fn lookup(&self, word: &str) -> Option<&UnitDef> {
        let cleaned = word
            .trim()
            .trim_end_matches(['.', ',', ';', ':'])
            .to_lowercase();
        self.synonyms.get(cleaned.as_str()).map(|&i| &self.units[i])
    }

    /// Canonical spelling of a unit; unknown units are passed through lowercased.
    pub fn standardize(&self, unit: &str) -> String {
        match self.lookup(unit) {
            Some(def) => def.canonical.to_string(),
            None => unit.trim().to_lowercase(),
        }
    }

    pub fn dimension(&self, unit: &str) -> Option<Dimension> {
        self.lookup(unit).map(|def| def.dimension)
    }

    pub fn fraction_words(&self) -> &[(&'static str, f64)] {
        &self.fraction_words
    }

    pub fn fraction_value(&self, word: &str) -> Option<f64> {
        let word = word.to_lowercase();
        self.fraction_words
            .iter()
            .find(|(w, _)| *w == word)
            .map(|(_, value)| *value)
    }
}
