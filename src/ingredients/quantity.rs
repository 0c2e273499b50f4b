use regex::{Captures, Regex};
use std::ops::Range;
use std::sync::LazyLock;

use crate::units::UnitTable;

const VULGAR: &str = "½⅓⅔¼¾⅕⅖⅗⅘⅙⅚⅛⅜⅝⅞";

// Alternatives are tried in order at each position, so a mixed number wins
// over the integer it starts with and a range over its lower bound.
static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?x)
        (?P<mixed>(?P<mw>\d+)\s+(?P<mn>\d+)\s*/\s*(?P<md>\d+))
        | (?P<umixed>(?P<uw>\d+)\s*(?P<uf>[{VULGAR}]))
        | (?P<range>(?P<lo>\d+(?:\.\d+)?)\s*(?:-|–|—|\bto\b)\s*(?P<hi>\d+(?:\.\d+)?))
        | (?P<frac>(?P<fnum>\d+)\s*/\s*(?P<fden>\d+))
        | (?P<vulgar>[{VULGAR}])
        | (?P<dec>\d+(?:\.\d+)?)
        "
    ))
    .expect("number pattern")
});

static FRACTION_WORD: LazyLock<Regex> = LazyLock::new(|| {
    let words = UnitTable::standard()
        .fraction_words()
        .iter()
        .map(|(word, _)| regex::escape(word))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{words})\b")).expect("fraction word pattern")
});

/// A located quantity token. `value` is `Err` with a reason when the
/// arithmetic is invalid.
#[derive(Debug, Clone, PartialEq)]
pub struct AmountToken {
    pub span: Range<usize>,
    pub value: Result<f64, String>,
}

/// Find the first quantity in `text`, falling back to fraction words when no
/// digits are present.
pub fn locate_amount(text: &str, units: &UnitTable) -> Option<AmountToken> {
    if let Some(caps) = NUMBER.captures(text) {
        let whole = caps.get(0)?;
        return Some(AmountToken {
            span: whole.range(),
            value: evaluate(&caps),
        });
    }

    let found = FRACTION_WORD.find(text)?;
    let value = units.fraction_value(found.as_str())?;
    Some(AmountToken {
        span: found.range(),
        value: Ok(value),
    })
}

fn evaluate(caps: &Captures) -> Result<f64, String> {
    let number = |name: &str| -> f64 {
        caps.name(name)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .unwrap_or(0.0)
    };

    if caps.name("mixed").is_some() {
        let fraction = divide(number("mn"), number("md"), &caps[0])?;
        return Ok(number("mw") + fraction);
    }
    if caps.name("umixed").is_some() {
        return Ok(number("uw") + vulgar_value(&caps["uf"]));
    }
    if caps.name("range").is_some() {
        return Ok((number("lo") + number("hi")) / 2.0);
    }
    if caps.name("frac").is_some() {
        return divide(number("fnum"), number("fden"), &caps[0]);
    }
    if caps.name("vulgar").is_some() {
        return Ok(vulgar_value(&caps["vulgar"]));
    }
    Ok(number("dec"))
}

fn divide(numerator: f64, denominator: f64, token: &str) -> Result<f64, String> {
    if denominator == 0.0 {
        return Err(format!("zero denominator in \"{}\"", token.trim()));
    }
    Ok(numerator / denominator)
}

fn vulgar_value(symbol: &str) -> f64 {
    match symbol {
        "½" => 0.5,
        "⅓" => 1.0 / 3.0,
        "⅔" => 2.0 / 3.0,
        "¼" => 0.25,
        "¾" => 0.75,
        "⅕" => 0.2,
        "⅖" => 0.4,
        "⅗" => 0.6,
        "⅘" => 0.8,
        "⅙" => 1.0 / 6.0,
        "⅚" => 5.0 / 6.0,
        "⅛" => 0.125,
        "⅜" => 0.375,
        "⅝" => 0.625,
        "⅞" => 0.875,
        _ => 0.0,
    }
}
