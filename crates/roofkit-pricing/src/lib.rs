//! # RoofKit Pricing
//!
//! Turns roof measurements into a priced material list.
//!
//! Product prices are read off retailer product pages by an ordered chain of
//! extractors (JSON-LD first, then Next.js page data), the purchase unit is
//! inferred from the product name, and requests to one host are spaced out.
//! This crate is independent of the measurement workflow; it only consumes
//! area, perimeter, and line length in feet.

pub mod catalog;
pub mod error;
pub mod estimate;
pub mod extract;
pub mod gate;
pub mod scraper;
pub mod units;

pub use catalog::{fallback_catalog, CatalogProduct, MaterialKind, ProductCatalog};
pub use error::{PricingError, PricingResult};
pub use estimate::{EstimateLine, MaterialEstimate};
pub use extract::{ExtractorChain, JsonLdExtractor, NextDataExtractor, ProductExtractor, ProductFact};
pub use gate::RequestGate;
pub use scraper::{HttpPageFetcher, PageFetcher, ProductScraper, ScrapedProduct};
pub use units::{infer_unit, UnitType};
