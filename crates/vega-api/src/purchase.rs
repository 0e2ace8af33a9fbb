//! # Purchase Submission
//!
//! Converts a transaction snapshot into a purchase request and submits
//! it exactly once.
//!
//! ## Idempotency Under Retry
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Checkout pressed                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Transaction { submission_id: "a1b2…", lines, totals }                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  POST /purchase  Idempotency-Key: a1b2…   ──── timeout ────┐           │
//! │       ▲                                                     │           │
//! │       │              (exponential backoff)                  │           │
//! │       └─────────────────────────────────────────────────────┘           │
//! │                                                                         │
//! │  Every attempt carries the SAME key: the server commits at most one    │
//! │  sale no matter how many attempts arrive. The id is regenerated only   │
//! │  when the user starts a NEW logical checkout (edited cart).            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Retry Classification
//! - Transient (retried): `Unavailable`, `Timeout`
//! - Permanent (surfaced immediately): `SubmissionFailed` (4xx),
//!   `InvalidResponse`
//!
//! On ANY failure the caller keeps the cart and the transaction
//! unchanged; retrying later reuses the same submission id.

use async_trait::async_trait;
use backoff::ExponentialBackoff;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use vega_core::{Money, Totals, Transaction};

use crate::config::{ApiConfig, SubmitSettings};
use crate::error::{ApiError, ApiResult};

/// Header carrying the submission id on every attempt.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

// =============================================================================
// Capability Trait
// =============================================================================

/// Purchase submission capability.
///
/// Injected into the register; tests substitute a mock endpoint that
/// tracks seen submission ids.
#[async_trait]
pub trait SubmitPurchase: Send + Sync {
    /// Submits the transaction and returns the server-confirmed totals.
    async fn submit(&self, transaction: &Transaction) -> ApiResult<Totals>;
}

// =============================================================================
// Wire Types
// =============================================================================

/// One entry of the purchase body's `cart` array.
///
/// The wire contract carries no quantity: one entry per cart line, with
/// the amounts folded into the totals.
#[derive(Debug, Clone, Serialize)]
struct PurchaseLineWire {
    name: String,
    price: i64,
    barcode: String,
}

/// Purchase request body.
#[derive(Debug, Clone, Serialize)]
struct PurchaseRequestWire {
    cart: Vec<PurchaseLineWire>,
    #[serde(rename = "totalAmt")]
    total_amt: i64,
    #[serde(rename = "totalAmtExTax")]
    total_amt_ex_tax: i64,
}

impl From<&Transaction> for PurchaseRequestWire {
    fn from(txn: &Transaction) -> Self {
        PurchaseRequestWire {
            cart: txn
                .lines
                .iter()
                .map(|line| PurchaseLineWire {
                    name: line.name.clone(),
                    price: line.unit_price.minor(),
                    barcode: line.barcode.clone(),
                })
                .collect(),
            total_amt: txn.totals.total_incl_tax.minor(),
            total_amt_ex_tax: txn.totals.total_excl_tax.minor(),
        }
    }
}

/// Purchase response body: the server-confirmed totals.
#[derive(Debug, Deserialize)]
struct PurchaseResponseWire {
    #[serde(rename = "totalAmt")]
    total_amt: i64,
    #[serde(rename = "totalAmtExTax")]
    total_amt_ex_tax: i64,
}

impl From<PurchaseResponseWire> for Totals {
    fn from(wire: PurchaseResponseWire) -> Self {
        Totals {
            total_incl_tax: Money::from_minor(wire.total_amt),
            total_excl_tax: Money::from_minor(wire.total_amt_ex_tax),
        }
    }
}

// =============================================================================
// HTTP Purchase Client
// =============================================================================

/// Purchase submitter backed by `POST {base}/purchase`.
#[derive(Debug, Clone)]
pub struct HttpPurchaseClient {
    http: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
    retry: SubmitSettings,
}

impl HttpPurchaseClient {
    /// Creates a purchase client from the API configuration.
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::InvalidConfig(e.to_string()))?;

        Ok(HttpPurchaseClient {
            http,
            base_url: config.base_url().to_string(),
            timeout_secs: config.api.request_timeout_secs,
            retry: config.submit,
        })
    }

    fn backoff_policy(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: Duration::from_millis(self.retry.initial_backoff_ms),
            max_interval: Duration::from_secs(self.retry.max_backoff_secs),
            max_elapsed_time: Some(Duration::from_secs(self.retry.max_elapsed_secs)),
            ..ExponentialBackoff::default()
        }
    }

    fn map_transport(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout(self.timeout_secs)
        } else {
            ApiError::Unavailable(err.to_string())
        }
    }

    /// One submit attempt. The idempotency key makes repeating this
    /// safe: the request body and the key never change between attempts.
    async fn post_once(
        &self,
        request: &PurchaseRequestWire,
        submission_id: &str,
    ) -> ApiResult<Totals> {
        let url = format!("{}/purchase", self.base_url);
        let response = self
            .http
            .post(&url)
            .header(IDEMPOTENCY_KEY_HEADER, submission_id)
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(ApiError::Unavailable(format!(
                "purchase endpoint returned status {}",
                status.as_u16()
            )));
        }
        if !status.is_success() {
            return Err(ApiError::SubmissionFailed {
                status: status.as_u16(),
            });
        }

        let wire: PurchaseResponseWire = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;

        Ok(Totals::from(wire))
    }
}

#[async_trait]
impl SubmitPurchase for HttpPurchaseClient {
    async fn submit(&self, transaction: &Transaction) -> ApiResult<Totals> {
        let request = PurchaseRequestWire::from(transaction);
        let submission_id = transaction.submission_id.as_str();
        debug!(
            submission_id = %submission_id,
            lines = request.cart.len(),
            total = request.total_amt,
            "Submitting purchase"
        );

        let totals = backoff::future::retry(self.backoff_policy(), || async {
            self.post_once(&request, submission_id)
                .await
                .map_err(|e| {
                    if e.is_retryable() {
                        warn!(submission_id = %submission_id, error = %e, "Transient submit failure, backing off");
                        backoff::Error::transient(e)
                    } else {
                        backoff::Error::permanent(e)
                    }
                })
        })
        .await?;

        info!(
            submission_id = %submission_id,
            total = totals.total_incl_tax.minor(),
            "Purchase confirmed"
        );
        Ok(totals)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use vega_core::{Cart, Product, TaxRate};

    fn sample_transaction() -> Transaction {
        let mut cart = Cart::new(TaxRate::from_bps(1000));
        cart.add_line(&Product::new("123456", "Apple", Money::from_minor(105)), 3)
            .unwrap();
        cart.add_line(&Product::new("789012", "Banana", Money::from_minor(150)), 1)
            .unwrap();
        Transaction::snapshot(&cart, "a1b2c3".to_string()).unwrap()
    }

    #[test]
    fn test_request_wire_field_names() {
        let request = PurchaseRequestWire::from(&sample_transaction());
        let json = serde_json::to_value(&request).unwrap();

        // Exact wire contract of POST /purchase
        assert!(json.get("cart").is_some());
        assert_eq!(json["totalAmt"], 465);
        assert_eq!(json["totalAmtExTax"], 421); // 95*3 + 136

        let first = &json["cart"][0];
        assert_eq!(first["name"], "Apple");
        assert_eq!(first["price"], 105);
        assert_eq!(first["barcode"], "123456");
        // No quantity on the wire - one entry per cart line
        assert!(first.get("quantity").is_none());
    }

    #[test]
    fn test_one_wire_entry_per_line() {
        let request = PurchaseRequestWire::from(&sample_transaction());
        assert_eq!(request.cart.len(), 2);
    }

    #[test]
    fn test_response_wire_to_totals() {
        let wire: PurchaseResponseWire =
            serde_json::from_str(r#"{"totalAmt":465,"totalAmtExTax":421}"#).unwrap();
        let totals = Totals::from(wire);
        assert_eq!(totals.total_incl_tax.minor(), 465);
        assert_eq!(totals.total_excl_tax.minor(), 421);
    }
}
