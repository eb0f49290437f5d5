//! Material quantities and costs for a measured roof.
//!
//! Area materials scale with the roof area, starter strip with the perimeter,
//! and ridge cap with the total capping line length. Each quantity adds a
//! waste allowance and rounds up to whole purchase units.

use serde::Serialize;

use roofkit_core::PolygonMetrics;
use roofkit_settings::PricingSettings;

use crate::catalog::{CatalogProduct, MaterialKind, ProductCatalog};

/// Extra quantity suggested on top of the estimate.
pub const BUFFER_FACTOR: f64 = 1.2;

/// Measurement a material is bought against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Basis {
    Area,
    Perimeter,
    LineLength,
}

struct MaterialRule {
    kind: MaterialKind,
    basis: Basis,
    waste: f64,
    unit_label: &'static str,
}

const RULES: [MaterialRule; 5] = [
    MaterialRule {
        kind: MaterialKind::Shingles,
        basis: Basis::Area,
        waste: 0.05,
        unit_label: "bundles",
    },
    MaterialRule {
        kind: MaterialKind::Underlayment,
        basis: Basis::Area,
        waste: 0.10,
        unit_label: "rolls",
    },
    MaterialRule {
        kind: MaterialKind::LeakBarrier,
        basis: Basis::Area,
        waste: 0.05,
        unit_label: "rolls",
    },
    MaterialRule {
        kind: MaterialKind::StarterStrip,
        basis: Basis::Perimeter,
        waste: 0.05,
        unit_label: "units",
    },
    MaterialRule {
        kind: MaterialKind::RidgeCap,
        basis: Basis::LineLength,
        waste: 0.05,
        unit_label: "bundles",
    },
];

/// One row of the estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateLine {
    pub kind: MaterialKind,
    pub name: String,
    pub url: String,
    pub quantity: u32,
    pub unit: &'static str,
    pub unit_cost: f64,
    pub total_cost: f64,
}

impl EstimateLine {
    pub fn buffered_quantity(&self) -> u32 {
        (self.quantity as f64 * BUFFER_FACTOR).ceil() as u32
    }

    pub fn buffered_cost(&self) -> f64 {
        self.buffered_quantity() as f64 * self.unit_cost
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MaterialEstimate {
    pub lines: Vec<EstimateLine>,
    pub total_cost: f64,
}

impl MaterialEstimate {
    /// Estimate from the built-in prices.
    pub fn from_measurements(area_ft2: f64, perimeter_ft: f64, line_ft: f64) -> Self {
        let catalog = ProductCatalog::from_settings(&PricingSettings::default(), chrono::Utc::now());
        Self::with_catalog(&catalog, area_ft2, perimeter_ft, line_ft)
    }

    pub fn from_metrics(metrics: &PolygonMetrics, line_ft: f64) -> Self {
        Self::from_measurements(metrics.area_ft2, metrics.perimeter_ft, line_ft)
    }

    /// Like [`MaterialEstimate::with_catalog`], taking the area and perimeter
    /// from measured metrics.
    pub fn from_catalog_metrics(
        catalog: &ProductCatalog,
        metrics: &PolygonMetrics,
        line_ft: f64,
    ) -> Self {
        let stale = catalog.stale(chrono::Utc::now());
        if !stale.is_empty() {
            tracing::warn!(
                "Estimating with prices older than {} days for {:?}",
                catalog.max_age_days(),
                stale
            );
        }
        Self::with_catalog(catalog, metrics.area_ft2, metrics.perimeter_ft, line_ft)
    }

    /// Estimate from catalog prices. Empty when there is no roof area.
    pub fn with_catalog(
        catalog: &ProductCatalog,
        area_ft2: f64,
        perimeter_ft: f64,
        line_ft: f64,
    ) -> Self {
        if area_ft2 <= 0.0 {
            return Self::default();
        }

        let lines: Vec<EstimateLine> = RULES
            .iter()
            .filter_map(|rule| {
                let product = catalog.get(rule.kind)?;
                let measured = match rule.basis {
                    Basis::Area => area_ft2,
                    Basis::Perimeter => perimeter_ft,
                    Basis::LineLength => line_ft,
                };
                Some(line_for(rule, &product, measured))
            })
            .collect();

        let total_cost = lines.iter().map(|l| l.total_cost).sum();
        Self { lines, total_cost }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn buffered_total(&self) -> f64 {
        self.lines.iter().map(EstimateLine::buffered_cost).sum()
    }
}

fn line_for(rule: &MaterialRule, product: &CatalogProduct, measured: f64) -> EstimateLine {
    let needed = measured * (1.0 + rule.waste);
    let quantity = if product.coverage_area > 0.0 {
        (needed / product.coverage_area).ceil().max(0.0) as u32
    } else {
        0
    };
    EstimateLine {
        kind: rule.kind,
        name: product.name.clone(),
        url: product.url.clone(),
        quantity,
        unit: rule.unit_label,
        unit_cost: product.price_per_unit,
        total_cost: quantity as f64 * product.price_per_unit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_quantities_round_up_with_waste() {
        let estimate = MaterialEstimate::from_measurements(1000.0, 100.0, 40.0);
        let quantities: Vec<u32> = estimate.lines.iter().map(|l| l.quantity).collect();
        // 1050/33.3, 1100/1000, 1050/200, 105/50, 42/20
        assert_eq!(quantities, vec![32, 2, 6, 3, 3]);
        assert!(close(estimate.total_cost, 2709.78));
    }

    #[test]
    fn test_buffered_quantities() {
        let estimate = MaterialEstimate::from_measurements(1000.0, 100.0, 40.0);
        let shingles = &estimate.lines[0];
        assert_eq!(shingles.unit, "bundles");
        assert_eq!(shingles.buffered_quantity(), 39);
        assert!(close(shingles.buffered_cost(), 39.0 * 45.11));
    }

    #[test]
    fn test_no_lines_means_no_ridge_cap() {
        let estimate = MaterialEstimate::from_measurements(1000.0, 100.0, 0.0);
        let ridge = estimate
            .lines
            .iter()
            .find(|l| l.kind == MaterialKind::RidgeCap)
            .unwrap();
        assert_eq!(ridge.quantity, 0);
        assert_eq!(ridge.total_cost, 0.0);
    }

    #[test]
    fn test_zero_area_is_empty() {
        let estimate = MaterialEstimate::from_measurements(0.0, 100.0, 40.0);
        assert!(estimate.is_empty());
        assert_eq!(estimate.total_cost, 0.0);
    }
}
