use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::model::{Product, Quantity};
use crate::units::convert;

/// Weights of the package scoring heuristic. The defaults are hand-tuned
/// values, not a validated model; override them in `[matching.weights]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Score before any penalty
    pub baseline: f64,
    /// Penalty per unit of absolute size difference
    pub size_difference: f64,
    /// Penalty per unit of deviation from `target_ratio`
    pub ratio_deviation: f64,
    /// Preferred package/recipe size ratio, slightly above 1 so leftovers beat shortfalls
    pub target_ratio: f64,
    /// Penalty per unit of price per package unit
    pub price_per_unit: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        ScoringWeights {
            baseline: 100.0,
            size_difference: 2.0,
            ratio_deviation: 10.0,
            target_ratio: 1.2,
            price_per_unit: 5.0,
        }
    }
}

impl ScoringWeights {
    /// Score one candidate, or `None` when its package size is unknown.
    /// Unsized candidates rank after every sized one, see [`compare_scores`].
    pub fn score(&self, target: &Quantity, product: &Product) -> Option<f64> {
        let package = package_amount(target, &product.package_size).filter(|p| *p > 0.0)?;

        let mut score = self.baseline;
        if let Some(wanted) = target.amount.filter(|t| *t > 0.0) {
            score -= self.size_difference * (package - wanted).abs();
            score -= self.ratio_deviation * (package / wanted - self.target_ratio).abs();
        }
        Some(score - self.price_per_unit * (product.price / package))
    }
}

/// Best first: higher scores lead and unscored candidates trail
pub fn compare_scores(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Package amount expressed in the target's unit. Without a conversion path
/// the package keeps its own amount.
fn package_amount(target: &Quantity, package: &Quantity) -> Option<f64> {
    let amount = package.amount?;
    match (target.unit.as_deref(), package.unit.as_deref()) {
        (Some(to), Some(from)) => Some(convert(amount, from, to, None).unwrap_or(amount)),
        _ => Some(amount),
    }
}
