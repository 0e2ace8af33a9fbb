//! # Catalog Lookup
//!
//! Resolves a decoded barcode to a product record.
//!
//! ## Lookup Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Decoded symbol "4901234567894"                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_barcode ── reject empty/garbage before any request            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  GET {base}/product/4901234567894                                       │
//! │       │                                                                 │
//! │       ├── 2xx { name, price } ──► Product (price = tax-inclusive)       │
//! │       ├── 404 ──────────────────► ApiError::NotFound   (re-scan)        │
//! │       └── 5xx / transport ──────► ApiError::Unavailable (retry)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Callers must not touch the cart on any error from here: a failed
//! lookup stages nothing.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use vega_core::validation::{validate_barcode, validate_price};
use vega_core::{Money, Product};

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};

// =============================================================================
// Capability Trait
// =============================================================================

/// Catalog lookup capability.
///
/// Injected into the register so the product source can be swapped: a
/// live HTTP catalog in production, an in-memory map in tests.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Resolves a barcode to a product.
    ///
    /// `barcode` must be a non-empty decodable symbol string; it is
    /// validated before any request goes out.
    async fn lookup(&self, barcode: &str) -> ApiResult<Product>;
}

// =============================================================================
// Wire Types
// =============================================================================

/// Catalog response body: `{ "name": ..., "price": ... }`.
/// The price is the tax-inclusive shelf price in minor units.
#[derive(Debug, Deserialize)]
struct ProductWire {
    name: String,
    price: i64,
}

// =============================================================================
// HTTP Catalog
// =============================================================================

/// Catalog backed by `GET {base}/product/{barcode}`.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    http: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl HttpCatalog {
    /// Creates a catalog client from the API configuration.
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::InvalidConfig(e.to_string()))?;

        Ok(HttpCatalog {
            http,
            base_url: config.base_url().to_string(),
            timeout_secs: config.api.request_timeout_secs,
        })
    }

    fn map_transport(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout(self.timeout_secs)
        } else {
            ApiError::Unavailable(err.to_string())
        }
    }
}

#[async_trait]
impl CatalogLookup for HttpCatalog {
    async fn lookup(&self, barcode: &str) -> ApiResult<Product> {
        let barcode = validate_barcode(barcode)?;
        debug!(barcode = %barcode, "Catalog lookup");

        let url = format!("{}/product/{}", self.base_url, barcode);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound { barcode });
        }
        if !status.is_success() {
            return Err(ApiError::Unavailable(format!(
                "catalog returned status {}",
                status.as_u16()
            )));
        }

        let wire: ProductWire = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        validate_price(wire.price)?;

        Ok(Product::new(barcode, wire.name, Money::from_minor(wire.price)))
    }
}

// =============================================================================
// In-Memory Catalog
// =============================================================================

/// Catalog backed by an in-memory map.
///
/// The substitution point the register tests use; also handy for demo
/// setups with a handful of products and no server.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    products: HashMap<String, Product>,
}

impl MemoryCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a product, keyed by its barcode.
    pub fn insert(&mut self, product: Product) {
        self.products.insert(product.barcode.clone(), product);
    }

    /// Builder-style insert for test setup.
    pub fn with(mut self, product: Product) -> Self {
        self.insert(product);
        self
    }
}

#[async_trait]
impl CatalogLookup for MemoryCatalog {
    async fn lookup(&self, barcode: &str) -> ApiResult<Product> {
        let barcode = validate_barcode(barcode)?;
        self.products
            .get(&barcode)
            .cloned()
            .ok_or(ApiError::NotFound { barcode })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog() -> MemoryCatalog {
        MemoryCatalog::new()
            .with(Product::new("123456", "Apple", Money::from_minor(100)))
            .with(Product::new("789012", "Banana", Money::from_minor(150)))
    }

    #[tokio::test]
    async fn test_memory_catalog_hit() {
        let catalog = sample_catalog();
        let product = catalog.lookup("123456").await.unwrap();
        assert_eq!(product.name, "Apple");
        assert_eq!(product.unit_price.minor(), 100);
    }

    #[tokio::test]
    async fn test_memory_catalog_miss_is_not_found() {
        let catalog = sample_catalog();
        let err = catalog.lookup("000000").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound { barcode } if barcode == "000000"));
    }

    #[tokio::test]
    async fn test_empty_barcode_rejected_before_lookup() {
        let catalog = sample_catalog();
        let err = catalog.lookup("   ").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_product_wire_shape() {
        let wire: ProductWire = serde_json::from_str(r#"{"name":"Apple","price":100}"#).unwrap();
        assert_eq!(wire.name, "Apple");
        assert_eq!(wire.price, 100);
    }
}
