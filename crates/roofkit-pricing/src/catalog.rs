//! Known roofing products and their last known prices.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use roofkit_settings::PricingSettings;

use crate::error::PricingResult;
use crate::scraper::{PageFetcher, ProductScraper, ScrapedProduct};
use crate::units::UnitType;

/// What a catalog entry is used for in an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialKind {
    Shingles,
    Underlayment,
    LeakBarrier,
    StarterStrip,
    RidgeCap,
}

/// A product with its last known price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub name: String,
    pub url: String,
    pub price_per_unit: f64,
    pub unit_type: UnitType,
    /// Square or linear feet covered by one purchased unit
    pub coverage_area: f64,
    pub last_updated: DateTime<Utc>,
}

impl CatalogProduct {
    pub fn from_scraped(url: impl Into<String>, scraped: ScrapedProduct, now: DateTime<Utc>) -> Self {
        Self {
            name: scraped.name,
            url: url.into(),
            price_per_unit: scraped.price,
            unit_type: scraped.unit_type,
            coverage_area: scraped.coverage_area,
            last_updated: now,
        }
    }

    /// True when the price is older than `max_age_days`.
    pub fn is_stale(&self, now: DateTime<Utc>, max_age_days: i64) -> bool {
        now.signed_duration_since(self.last_updated) > Duration::days(max_age_days)
    }
}

fn product(
    name: &str,
    url: &str,
    price_per_unit: f64,
    unit_type: UnitType,
    coverage_area: f64,
    now: DateTime<Utc>,
) -> CatalogProduct {
    CatalogProduct {
        name: name.to_string(),
        url: url.to_string(),
        price_per_unit,
        unit_type,
        coverage_area,
        last_updated: now,
    }
}

/// Built-in prices used when nothing fresher is known.
pub fn fallback_catalog(now: DateTime<Utc>) -> Vec<(MaterialKind, CatalogProduct)> {
    vec![
        (
            MaterialKind::Shingles,
            product(
                "GAF Timberline HDZ Weathered Wood High Definition Roof Shingles",
                "https://www.homedepot.ca/product/gaf-timberline-hdz-weathered-wood-high-definition-roof-shingles-33-3-sq-ft-per-bdl-21-pcs-/1000730987",
                45.11,
                UnitType::SquareFoot,
                33.3,
                now,
            ),
        ),
        (
            MaterialKind::Underlayment,
            product(
                "GAF FeltBuster Synthetic Roofing Underlayment",
                "https://www.homedepot.ca/product/gaf-1000-sq-ft-feltbuster-synthetic-roofing-underlayment-roll/1000800427",
                151.0,
                UnitType::SquareFoot,
                1000.0,
                now,
            ),
        ),
        (
            MaterialKind::LeakBarrier,
            product(
                "GAF WeatherWatch Mineral Surfaced Peel and Stick Roof Leak Barrier",
                "https://www.homedepot.ca/product/gaf-200-sq-ft-weatherwatch-mineral-surfaced-peel-and-stick-roof-leak-barrier-roll/1000731325",
                97.96,
                UnitType::SquareFoot,
                200.0,
                now,
            ),
        ),
        (
            MaterialKind::StarterStrip,
            product(
                "GAF WeatherBlocker Premium Eave and Rake Roof Starter Strip Shingles",
                "https://www.homedepot.ca/product/gaf-weatherblocker-50-lin-ft-premium-eave-and-rake-roof-starter-strip-shingles/1000731326",
                65.75,
                UnitType::LinearFoot,
                50.0,
                now,
            ),
        ),
        (
            MaterialKind::RidgeCap,
            product(
                "GAF Timbertex Charcoal Premium Hip and Ridge Cap Roof Shingles",
                "https://www.homedepot.ca/product/gaf-timbertex-charcoal-premium-hip-and-ridge-cap-roof-shingles-20-lin-ft-per-bundle-30-pieces-/1001016707",
                59.75,
                UnitType::LinearFoot,
                20.0,
                now,
            ),
        ),
    ]
}

/// Products by material, refreshed from their pages when stale.
#[derive(Debug)]
pub struct ProductCatalog {
    products: RwLock<HashMap<MaterialKind, CatalogProduct>>,
    max_age_days: i64,
}

impl ProductCatalog {
    /// Starts from the built-in prices.
    pub fn with_fallback(now: DateTime<Utc>, max_age_days: i64) -> Self {
        Self {
            products: RwLock::new(fallback_catalog(now).into_iter().collect()),
            max_age_days,
        }
    }

    /// Built-in prices dated `now`, aged by the configured staleness window.
    pub fn from_settings(settings: &PricingSettings, now: DateTime<Utc>) -> Self {
        Self::with_fallback(now, settings.stale_after_days)
    }

    pub fn max_age_days(&self) -> i64 {
        self.max_age_days
    }

    pub fn get(&self, kind: MaterialKind) -> Option<CatalogProduct> {
        self.products.read().get(&kind).cloned()
    }

    /// Replaces the entry for `kind`.
    pub fn upsert(&self, kind: MaterialKind, product: CatalogProduct) {
        self.products.write().insert(kind, product);
    }

    pub fn stale(&self, now: DateTime<Utc>) -> Vec<MaterialKind> {
        let mut kinds: Vec<MaterialKind> = self
            .products
            .read()
            .iter()
            .filter(|(_, p)| p.is_stale(now, self.max_age_days))
            .map(|(kind, _)| *kind)
            .collect();
        kinds.sort_by_key(|kind| *kind as u8);
        kinds
    }

    /// Re-scrapes every stale entry. A failed page keeps its last known price.
    pub async fn refresh_stale<F: PageFetcher>(
        &self,
        scraper: &ProductScraper<F>,
        now: DateTime<Utc>,
    ) -> Vec<(MaterialKind, PricingResult<()>)> {
        let mut results = Vec::new();
        for kind in self.stale(now) {
            let Some(current) = self.get(kind) else {
                continue;
            };
            let outcome = match scraper.scrape(&current.url).await {
                Ok(scraped) => {
                    self.upsert(kind, CatalogProduct::from_scraped(current.url, scraped, now));
                    Ok(())
                }
                Err(e) => {
                    tracing::warn!("Keeping last known price for {:?}: {}", kind, e);
                    Err(e)
                }
            };
            results.push((kind, outcome));
        }
        results
    }
}
