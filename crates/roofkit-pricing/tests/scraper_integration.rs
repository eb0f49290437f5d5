use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Url;

use roofkit_pricing::{
    MaterialKind, PageFetcher, PricingError, PricingResult, ProductCatalog, ProductScraper,
    UnitType,
};
use roofkit_settings::PricingSettings;

/// Serves canned pages by path; unknown paths answer 404.
struct CannedFetcher {
    pages: HashMap<String, String>,
    delay: Option<Duration>,
}

impl CannedFetcher {
    fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(path, html)| (path.to_string(), html.to_string()))
                .collect(),
            delay: None,
        }
    }
}

#[async_trait]
impl PageFetcher for CannedFetcher {
    async fn fetch(&self, url: &Url) -> PricingResult<String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.pages
            .get(url.path())
            .cloned()
            .ok_or(PricingError::Http { status: 404 })
    }
}

fn settings() -> PricingSettings {
    PricingSettings {
        scrape_timeout_ms: 100,
        min_request_spacing_ms: 0,
        ..PricingSettings::default()
    }
}

const SHINGLES_PAGE: &str = r#"<html><head>
<script type="application/ld+json">
{"@context":"https://schema.org","@type":"Product","name":"GAF Timberline HDZ Shingles (33.3 sq. ft. per Bundle)",
 "sku":"1000730987","offers":{"@type":"Offer","price":"46.25","priceCurrency":"CAD"}}
</script></head><body></body></html>"#;

const RIDGE_PAGE: &str = r#"<html><body>
<script id="__NEXT_DATA__" type="application/json">
{"props":{"pageProps":{"initialData":{"product":{"name":"Timbertex Ridge Cap 20 lin. ft per Bundle","pricing":{"currentPrice":61.5}}}}}}
</script></body></html>"#;

#[tokio::test]
async fn test_scrape_json_ld_page() {
    let scraper = ProductScraper::new(CannedFetcher::new(&[("/shingles", SHINGLES_PAGE)]), &settings());
    let product = scraper
        .scrape("https://www.homedepot.ca/shingles")
        .await
        .unwrap();
    assert_eq!(product.price, 46.25);
    assert_eq!(product.unit_type, UnitType::SquareFoot);
    assert_eq!(product.coverage_area, 33.3);
    assert_eq!(product.sku.as_deref(), Some("1000730987"));
}

#[tokio::test]
async fn test_scrape_next_data_page() {
    let scraper = ProductScraper::new(CannedFetcher::new(&[("/ridge", RIDGE_PAGE)]), &settings());
    let product = scraper.scrape("https://www.homedepot.ca/ridge").await.unwrap();
    assert_eq!(product.price, 61.5);
    assert_eq!(product.unit_type, UnitType::LinearFoot);
    assert_eq!(product.coverage_area, 20.0);
    assert_eq!(product.currency, "CAD");
}

#[tokio::test]
async fn test_scrape_errors_are_distinct() {
    let scraper = ProductScraper::new(
        CannedFetcher::new(&[("/empty", "<html><body>sold out</body></html>")]),
        &settings(),
    );
    assert_eq!(
        scraper.scrape("not a url").await.unwrap_err(),
        PricingError::InvalidUrl("relative URL without a base".to_string())
    );
    assert_eq!(
        scraper.scrape("https://shop.example/missing").await.unwrap_err(),
        PricingError::Http { status: 404 }
    );
    assert_eq!(
        scraper.scrape("https://shop.example/empty").await.unwrap_err(),
        PricingError::ExtractionFailed
    );
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let mut fetcher = CannedFetcher::new(&[("/shingles", SHINGLES_PAGE)]);
    fetcher.delay = Some(Duration::from_millis(500));
    let scraper = ProductScraper::new(fetcher, &settings());
    let err = scraper
        .scrape("https://www.homedepot.ca/shingles")
        .await
        .unwrap_err();
    assert_eq!(err, PricingError::Timeout { timeout_ms: 100 });
}

#[tokio::test]
async fn test_refresh_updates_only_reachable_products() {
    let now = Utc::now();
    let catalog = ProductCatalog::with_fallback(now - chrono::Duration::days(10), 7);

    let shingles_path = Url::parse(&catalog.get(MaterialKind::Shingles).unwrap().url)
        .unwrap()
        .path()
        .to_string();
    let scraper = ProductScraper::new(
        CannedFetcher::new(&[(shingles_path.as_str(), SHINGLES_PAGE)]),
        &settings(),
    );

    let results = catalog.refresh_stale(&scraper, now).await;
    assert_eq!(results.len(), 5);
    assert_eq!(results.iter().filter(|(_, r)| r.is_ok()).count(), 1);

    let shingles = catalog.get(MaterialKind::Shingles).unwrap();
    assert_eq!(shingles.price_per_unit, 46.25);
    assert_eq!(shingles.last_updated, now);

    // Unreachable pages keep their last known price
    let ridge = catalog.get(MaterialKind::RidgeCap).unwrap();
    assert_eq!(ridge.price_per_unit, 59.75);
    assert_eq!(catalog.stale(now).len(), 4);
}
