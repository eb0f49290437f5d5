//! Product facts from product page HTML.
//!
//! Extraction is a best-effort chain: each [`ProductExtractor`] looks at the
//! page its own way and the first one that yields a named, priced product
//! wins. Nothing is merged across extractors.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Default currency when the page does not name one.
pub const DEFAULT_CURRENCY: &str = "CAD";

/// Deepest nesting level searched for a product-shaped object.
pub const MAX_SEARCH_DEPTH: usize = 10;

static JSON_LD_SCRIPT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<script[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .expect("invalid json-ld regex")
});

static NEXT_DATA_SCRIPT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<script[^>]*id\s*=\s*["']__NEXT_DATA__["'][^>]*>(.*?)</script>"#)
        .expect("invalid next data regex")
});

/// What an extractor learned about a product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFact {
    pub name: String,
    pub price: f64,
    pub currency: String,
    pub sku: Option<String>,
}

/// One way of reading a product off a page.
pub trait ProductExtractor: Send + Sync {
    fn name(&self) -> &'static str;
    fn extract(&self, html: &str) -> Option<ProductFact>;
}

/// Reads numbers the way loosely typed page data writes them.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn valid_price(price: f64, max_price: f64) -> Option<f64> {
    (price.is_finite() && price > 0.0 && price <= max_price).then_some(price)
}

fn as_sku(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// schema.org `Product` objects in `application/ld+json` script blocks.
#[derive(Debug, Clone)]
pub struct JsonLdExtractor {
    max_price: f64,
}

impl JsonLdExtractor {
    pub fn new(max_price: f64) -> Self {
        Self { max_price }
    }

    fn from_product(&self, json: &Value) -> Option<ProductFact> {
        if json.get("@type").and_then(Value::as_str) != Some("Product") {
            return None;
        }
        let name = json.get("name")?.as_str()?.to_string();

        // Offers are an object on most pages, a list on some
        let offer = match json.get("offers")? {
            Value::Array(items) => items.first()?,
            other => other,
        };
        let raw_price = as_number(offer.get("price")?)?;
        let Some(price) = valid_price(raw_price, self.max_price) else {
            tracing::debug!("Rejecting JSON-LD price {} for '{}'", raw_price, name);
            return None;
        };

        let currency = offer
            .get("priceCurrency")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_CURRENCY)
            .to_string();

        Some(ProductFact {
            name,
            price,
            currency,
            sku: as_sku(json.get("sku")),
        })
    }
}

impl ProductExtractor for JsonLdExtractor {
    fn name(&self) -> &'static str {
        "json-ld"
    }

    fn extract(&self, html: &str) -> Option<ProductFact> {
        JSON_LD_SCRIPT
            .captures_iter(html)
            .filter_map(|caps| serde_json::from_str::<Value>(caps[1].trim()).ok())
            .find_map(|json| self.from_product(&json))
    }
}

/// Next.js `__NEXT_DATA__` page props, searched for a product-shaped object.
#[derive(Debug, Clone)]
pub struct NextDataExtractor {
    max_price: f64,
}

impl NextDataExtractor {
    pub fn new(max_price: f64) -> Self {
        Self { max_price }
    }
}

/// Depth-first search for an object with a string `name` and some price field.
pub fn find_product(value: &Value, depth: usize) -> Option<&Value> {
    if depth > MAX_SEARCH_DEPTH {
        return None;
    }
    match value {
        Value::Object(map) => {
            let named = map.get("name").map(Value::is_string).unwrap_or(false);
            let priced = ["price", "pricing", "currentPrice"]
                .iter()
                .any(|key| map.get(*key).map(is_truthy).unwrap_or(false));
            if named && priced {
                return Some(value);
            }
            map.values().find_map(|child| find_product(child, depth + 1))
        }
        Value::Array(items) => items.iter().find_map(|child| find_product(child, depth + 1)),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

impl ProductExtractor for NextDataExtractor {
    fn name(&self) -> &'static str {
        "next-data"
    }

    fn extract(&self, html: &str) -> Option<ProductFact> {
        let raw = NEXT_DATA_SCRIPT.captures(html)?;
        let data: Value = serde_json::from_str(raw[1].trim()).ok()?;
        let page_props = data.get("props")?.get("pageProps")?;
        let product = find_product(page_props, 0)?;

        let name = product.get("name")?.as_str()?.to_string();
        let pricing = product.get("pricing");
        let raw_price = product
            .get("price")
            .and_then(as_number)
            .or_else(|| pricing?.get("currentPrice").and_then(as_number))
            .or_else(|| pricing?.get("price").and_then(as_number))?;
        let price = valid_price(raw_price, self.max_price)?;

        Some(ProductFact {
            name,
            price,
            currency: DEFAULT_CURRENCY.to_string(),
            sku: as_sku(product.get("sku")),
        })
    }
}

/// Ordered extractors, first success wins.
pub struct ExtractorChain {
    extractors: Vec<Box<dyn ProductExtractor>>,
}

impl ExtractorChain {
    pub fn new(extractors: Vec<Box<dyn ProductExtractor>>) -> Self {
        Self { extractors }
    }

    /// JSON-LD first, then `__NEXT_DATA__`.
    pub fn standard(max_price: f64) -> Self {
        Self::new(vec![
            Box::new(JsonLdExtractor::new(max_price)),
            Box::new(NextDataExtractor::new(max_price)),
        ])
    }

    pub fn extract(&self, html: &str) -> Option<ProductFact> {
        self.extractors.iter().find_map(|extractor| {
            let fact = extractor.extract(html)?;
            tracing::debug!("{} extractor found '{}'", extractor.name(), fact.name);
            Some(fact)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MAX: f64 = 10_000.0;

    fn page(body: &str) -> String {
        format!("<html><head></head><body>{}</body></html>", body)
    }

    #[test]
    fn test_json_ld_product() {
        let html = page(
            r#"<script type="application/ld+json">
            {"@type":"Product","name":"GAF Shingles 33.3 sq ft","sku":"1000730987",
             "offers":{"price":"45.11","priceCurrency":"USD"}}
            </script>"#,
        );
        let fact = JsonLdExtractor::new(MAX).extract(&html).unwrap();
        assert_eq!(fact.name, "GAF Shingles 33.3 sq ft");
        assert_eq!(fact.price, 45.11);
        assert_eq!(fact.currency, "USD");
        assert_eq!(fact.sku.as_deref(), Some("1000730987"));
    }

    #[test]
    fn test_json_ld_skips_other_types_and_defaults_currency() {
        let html = page(
            r#"<script type="application/ld+json">{"@type":"BreadcrumbList","name":"x"}</script>
               <script type="application/ld+json">{"@type":"Product","name":"Roll","offers":{"price":151}}</script>"#,
        );
        let fact = JsonLdExtractor::new(MAX).extract(&html).unwrap();
        assert_eq!(fact.name, "Roll");
        assert_eq!(fact.currency, "CAD");
    }

    #[test]
    fn test_json_ld_rejects_out_of_range_price() {
        for price in ["0", "-5", "10000.01"] {
            let html = page(&format!(
                r#"<script type="application/ld+json">{{"@type":"Product","name":"X","offers":{{"price":{}}}}}</script>"#,
                price
            ));
            assert!(JsonLdExtractor::new(MAX).extract(&html).is_none(), "{}", price);
        }
    }

    #[test]
    fn test_find_product_depth_bound() {
        let mut nested = json!({"name": "Deep", "price": 10});
        for _ in 0..MAX_SEARCH_DEPTH {
            nested = json!({ "child": nested });
        }
        assert!(find_product(&nested, 0).is_some());

        let too_deep = json!({ "child": nested });
        assert!(find_product(&too_deep, 0).is_none());
    }

    #[test]
    fn test_find_product_requires_string_name() {
        let value = json!({"a": {"name": 5, "price": 3}, "b": [{"name": "Ok", "pricing": {"currentPrice": 7}}]});
        let found = find_product(&value, 0).unwrap();
        assert_eq!(found["name"], "Ok");
    }

    #[test]
    fn test_next_data_pricing_fallback() {
        let html = page(
            r#"<script id="__NEXT_DATA__" type="application/json">
            {"props":{"pageProps":{"data":{"product":{"name":"Ridge Cap 20 lin ft","pricing":{"currentPrice":"59.75"}}}}}}
            </script>"#,
        );
        let fact = NextDataExtractor::new(MAX).extract(&html).unwrap();
        assert_eq!(fact.name, "Ridge Cap 20 lin ft");
        assert_eq!(fact.price, 59.75);
        assert_eq!(fact.currency, "CAD");
    }

    #[test]
    fn test_chain_falls_through_to_next_data() {
        let html = page(
            r#"<script type="application/ld+json">{"@type":"Product","name":"X","offers":{"price":0}}</script>
               <script id="__NEXT_DATA__">{"props":{"pageProps":{"p":{"name":"Y","price":12.5}}}}</script>"#,
        );
        let fact = ExtractorChain::standard(MAX).extract(&html).unwrap();
        assert_eq!(fact.name, "Y");
        assert_eq!(fact.price, 12.5);
    }

    #[test]
    fn test_chain_fails_without_product() {
        assert!(ExtractorChain::standard(MAX)
            .extract(&page("<p>nothing here</p>"))
            .is_none());
    }
}
