//! Error types for product page scraping.

use thiserror::Error;

/// Errors that can occur while fetching or reading a product page.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// The page did not answer within the fetch bound.
    #[error("Request timeout - website took too long to respond ({timeout_ms}ms)")]
    Timeout { timeout_ms: u64 },

    /// The site answered with a non-success status.
    #[error("Website error: HTTP {status}")]
    Http { status: u16 },

    /// The request could not be sent or the body could not be read.
    #[error("Request failed: {0}")]
    Request(String),

    /// No extractor found a named, priced product on the page.
    #[error("Could not extract product data")]
    ExtractionFailed,

    /// The product URL could not be parsed or has no host.
    #[error("Invalid product URL: {0}")]
    InvalidUrl(String),
}

impl PricingError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, PricingError::Timeout { .. })
    }
}

/// Result type alias for pricing operations.
pub type PricingResult<T> = Result<T, PricingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_error_display() {
        assert_eq!(
            PricingError::Http { status: 503 }.to_string(),
            "Website error: HTTP 503"
        );
        assert_eq!(
            PricingError::ExtractionFailed.to_string(),
            "Could not extract product data"
        );
        assert!(PricingError::Timeout { timeout_ms: 15000 }.is_timeout());
        assert!(!PricingError::Http { status: 504 }.is_timeout());
    }
}
