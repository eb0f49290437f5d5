//! Product page scraping.
//!
//! Gate per host, fetch under a deadline, run the extractor chain, then infer
//! the purchase unit from the product name.

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use roofkit_settings::PricingSettings;

use crate::error::{PricingError, PricingResult};
use crate::extract::ExtractorChain;
use crate::gate::RequestGate;
use crate::units::{infer_unit, UnitType};

/// Retrieves the HTML of a product page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> PricingResult<String>;
}

/// Fetches pages over HTTP with browser-like headers.
#[derive(Debug, Clone, Default)]
pub struct HttpPageFetcher {
    client: reqwest::Client,
}

impl HttpPageFetcher {
    const USER_AGENT: &'static str =
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/120 Safari/537.36";

    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &Url) -> PricingResult<String> {
        let resp = self
            .client
            .get(url.clone())
            .header(reqwest::header::USER_AGENT, Self::USER_AGENT)
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-CA,en;q=0.9")
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await
            .map_err(|e| PricingError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(PricingError::Http {
                status: resp.status().as_u16(),
            });
        }

        resp.text()
            .await
            .map_err(|e| PricingError::Request(e.to_string()))
    }
}

/// A product read off its page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedProduct {
    pub name: String,
    pub price: f64,
    pub unit_type: UnitType,
    pub coverage_area: f64,
    pub currency: String,
    pub sku: Option<String>,
}

pub struct ProductScraper<F: PageFetcher> {
    fetcher: F,
    gate: RequestGate,
    chain: ExtractorChain,
    timeout: Duration,
}

impl<F: PageFetcher> ProductScraper<F> {
    pub fn new(fetcher: F, settings: &PricingSettings) -> Self {
        Self {
            fetcher,
            gate: RequestGate::new(settings.min_request_spacing()),
            chain: ExtractorChain::standard(settings.max_reasonable_price),
            timeout: settings.scrape_timeout(),
        }
    }

    pub fn with_chain(mut self, chain: ExtractorChain) -> Self {
        self.chain = chain;
        self
    }

    pub async fn scrape(&self, url: &str) -> PricingResult<ScrapedProduct> {
        let parsed = Url::parse(url).map_err(|e| PricingError::InvalidUrl(e.to_string()))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| PricingError::InvalidUrl(format!("{} has no host", url)))?
            .to_string();

        self.gate.wait_turn(&host).await;

        let html = match tokio::time::timeout(self.timeout, self.fetcher.fetch(&parsed)).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!("Product page {} timed out", url);
                return Err(PricingError::Timeout {
                    timeout_ms: self.timeout.as_millis() as u64,
                });
            }
        };

        let fact = self.chain.extract(&html).ok_or_else(|| {
            tracing::warn!("No product data found on {}", url);
            PricingError::ExtractionFailed
        })?;

        let (unit_type, coverage_area) = infer_unit(&fact.name);
        tracing::info!(
            "Scraped '{}' at {:.2} {} ({} x {})",
            fact.name,
            fact.price,
            fact.currency,
            coverage_area,
            unit_type
        );

        Ok(ScrapedProduct {
            name: fact.name,
            price: fact.price,
            unit_type,
            coverage_area,
            currency: fact.currency,
            sku: fact.sku,
        })
    }
}
