//! Purchase unit inference from product names.
//!
//! Roofing product names usually carry their coverage ("33.3 sq ft per
//! bundle", "50 lin ft"). The first pattern that matches decides the unit.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a product is sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnitType {
    #[serde(rename = "sqft")]
    SquareFoot,
    #[serde(rename = "linear_foot")]
    LinearFoot,
    #[default]
    #[serde(rename = "unit")]
    Unit,
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UnitType::SquareFoot => "sqft",
            UnitType::LinearFoot => "linear_foot",
            UnitType::Unit => "unit",
        };
        write!(f, "{}", label)
    }
}

static UNIT_PATTERNS: Lazy<Vec<(Regex, UnitType)>> = Lazy::new(|| {
    [
        (r"([\d.]+)\s*(?:sq\.?\s*)?ft", UnitType::SquareFoot),
        (r"([\d.]+)\s*lin\.?\s*ft", UnitType::LinearFoot),
        (r"([\d.]+)\s*ft\.?\s*(?:long|lin|linear)?", UnitType::LinearFoot),
    ]
    .into_iter()
    .map(|(pattern, unit)| (Regex::new(pattern).expect("invalid unit regex"), unit))
    .collect()
});

/// Unit type and coverage per purchased unit, `(Unit, 1.0)` when unknown.
pub fn infer_unit(product_name: &str) -> (UnitType, f64) {
    let name = product_name.to_lowercase();
    for (regex, unit) in UNIT_PATTERNS.iter() {
        let coverage = regex
            .captures(&name)
            .and_then(|caps| caps[1].parse::<f64>().ok());
        if let Some(coverage) = coverage {
            return (*unit, coverage);
        }
    }
    (UnitType::Unit, 1.0)
}
