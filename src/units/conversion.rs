use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use super::UnitTable;
use crate::error::ConversionError;

/// Directed edge: one `from_unit` equals `ratio` of `to_unit`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRatio {
    pub from_unit: String,
    pub to_unit: String,
    pub ratio: f64,
}

/// A set of ratio edges plus the default units two-hop conversions may pass
/// through. Units are stored in canonical spelling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionGraph {
    default_units: Vec<String>,
    edges: Vec<ConversionRatio>,
}

static STANDARD_GRAPH: LazyLock<ConversionGraph> = LazyLock::new(|| {
    ConversionGraph::new(["g", "ml", "cm"])
        // weight, hub g
        .with_ratio("mg", "g", 0.001)
        .with_ratio("kg", "g", 1000.0)
        .with_ratio("oz", "g", 28.349_523_125)
        .with_ratio("lb", "g", 453.592_37)
        // volume, hub ml
        .with_ratio("l", "ml", 1000.0)
        .with_ratio("tsp", "ml", 4.928_921_593_75)
        .with_ratio("tbsp", "ml", 14.786_764_781_25)
        .with_ratio("cup", "ml", 236.588_236_5)
        .with_ratio("fl oz", "ml", 29.573_529_562_5)
        .with_ratio("pint", "ml", 473.176_473)
        .with_ratio("quart", "ml", 946.352_946)
        .with_ratio("gallon", "ml", 3785.411_784)
        // length, hub cm
        .with_ratio("mm", "cm", 0.1)
        .with_ratio("m", "cm", 100.0)
        .with_ratio("in", "cm", 2.54)
        .with_ratio("ft", "cm", 30.48)
});

impl ConversionGraph {
    pub fn new<I, S>(default_units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let table = UnitTable::standard();
        ConversionGraph {
            default_units: default_units
                .into_iter()
                .map(|u| table.standardize(u.as_ref()))
                .collect(),
            edges: Vec::new(),
        }
    }

    /// The global metric/imperial graph
    pub fn standard() -> &'static ConversionGraph {
        &STANDARD_GRAPH
    }

    pub fn with_ratio(mut self, from_unit: &str, to_unit: &str, ratio: f64) -> Self {
        self.add_ratio(from_unit, to_unit, ratio);
        self
    }

    pub fn add_ratio(&mut self, from_unit: &str, to_unit: &str, ratio: f64) {
        let table = UnitTable::standard();
        self.edges.push(ConversionRatio {
            from_unit: table.standardize(from_unit),
            to_unit: table.standardize(to_unit),
            ratio,
        });
    }

    pub fn edges(&self) -> &[ConversionRatio] {
        &self.edges
    }

    /// Ratio for a single hop, using the edge itself or its inverse
    fn hop(&self, from: &str, to: &str) -> Option<f64> {
        if let Some(edge) = self
            .edges
            .iter()
            .find(|e| e.from_unit == from && e.to_unit == to)
        {
            return Some(edge.ratio);
        }

        self.edges
            .iter()
            .find(|e| e.from_unit == to && e.to_unit == from && e.ratio != 0.0)
            .map(|edge| 1.0 / edge.ratio)
    }

    fn ratio(&self, from: &str, to: &str) -> Option<f64> {
        if from == to {
            return Some(1.0);
        }
        if let Some(ratio) = self.hop(from, to) {
            return Some(ratio);
        }

        self.default_units
            .iter()
            .filter(|hub| hub.as_str() != from && hub.as_str() != to)
            .find_map(|hub| Some(self.hop(from, hub)? * self.hop(hub, to)?))
    }

    /// Convert within this graph only
    pub fn convert(&self, quantity: f64, from: &str, to: &str) -> Result<f64, ConversionError> {
        let table = UnitTable::standard();
        let from = table.standardize(from);
        let to = table.standardize(to);

        self.ratio(&from, &to)
            .map(|ratio| quantity * ratio)
            .ok_or(ConversionError { from, to })
    }
}

/// Convert `quantity` between units, trying ingredient-specific ratios (for
/// example cups of flour to grams) before the global graph.
pub fn convert(
    quantity: f64,
    from: &str,
    to: &str,
    ingredient_ratios: Option<&ConversionGraph>,
) -> Result<f64, ConversionError> {
    if let Some(graph) = ingredient_ratios {
        match graph.convert(quantity, from, to) {
            Ok(value) => return Ok(value),
            Err(e) => debug!("Ingredient ratios have no path: {}", e),
        }
    }

    ConversionGraph::standard().convert(quantity, from, to)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() < tolerance
    }

    #[test]
    fn test_grams_to_ounces() {
        let ounces = convert(500.0, "g", "oz", None).unwrap();
        assert!(approx(ounces, 17.637, 1e-2), "got {ounces}");
    }

    #[test]
    fn test_direct_edge() {
        assert!(approx(convert(2.0, "kg", "g", None).unwrap(), 2000.0, 1e-9));
    }

    #[test]
    fn test_reverse_edge() {
        assert!(approx(convert(1500.0, "ml", "l", None).unwrap(), 1.5, 1e-9));
    }

    #[test]
    fn test_two_hops_through_default_unit() {
        let tbsp = convert(1.0, "cup", "tbsp", None).unwrap();
        assert!(approx(tbsp, 16.0, 1e-6), "got {tbsp}");

        let pounds = convert(16.0, "oz", "pounds", None).unwrap();
        assert!(approx(pounds, 1.0, 1e-9), "got {pounds}");
    }

    #[test]
    fn test_round_trip() {
        let pairs = [
            ("g", "oz"),
            ("kg", "lb"),
            ("cup", "ml"),
            ("tsp", "tbsp"),
            ("l", "fl oz"),
            ("in", "mm"),
            ("gallon", "quart"),
        ];
        for (a, b) in pairs {
            for x in [0.25, 1.0, 3.5, 500.0] {
                let there = convert(x, a, b, None).unwrap();
                let back = convert(there, b, a, None).unwrap();
                assert!(approx(back, x, 1e-9 * x.max(1.0)), "{a}->{b}->{a}: {x} vs {back}");
            }
        }
    }

    #[test]
    fn test_synonyms_are_standardized() {
        let grams = convert(1.0, "kilograms", "grams", None).unwrap();
        assert!(approx(grams, 1000.0, 1e-9));
        assert_eq!(convert(3.0, "cups", "cup", None).unwrap(), 3.0);
    }

    #[test]
    fn test_no_path_names_both_units() {
        let err = convert(1.0, "cup", "g", None).unwrap_err();
        assert_eq!(err.from, "cup");
        assert_eq!(err.to, "g");
        assert_eq!(err.to_string(), "Cannot convert from cup to g");
    }

    #[test]
    fn test_ingredient_ratios_take_precedence() {
        let flour = ConversionGraph::new(["g"]).with_ratio("cup", "g", 125.0);
        let grams = convert(2.0, "cups", "g", Some(&flour)).unwrap();
        assert!(approx(grams, 250.0, 1e-9));

        // falls back to the global graph
        let ml = convert(1.0, "cup", "ml", Some(&flour)).unwrap();
        assert!(approx(ml, 236.588, 1e-3));
    }

    #[test]
    fn test_ingredient_two_hop() {
        let butter = ConversionGraph::new(["g"])
            .with_ratio("tbsp", "g", 14.0)
            .with_ratio("g", "oz", 0.035274);
        let ounces = butter.convert(2.0, "tbsp", "oz").unwrap();
        assert!(approx(ounces, 28.0 * 0.035274, 1e-9));
    }
}
