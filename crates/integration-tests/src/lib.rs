//! Integration test support for Warium.
//!
//! Provides [`MockBackend`], an in-memory implementation of the
//! storefront's `CommerceApi`, plus fixture builders shared by the
//! scenario tests in `tests/`. No external services are required.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p warium-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use warium_core::{Email, ProductId};
use warium_storefront::backend::{
    BackendError, CartRow, CommerceApi, OrderRecord, PaymentRequest, PaymentSession,
    ProductRecord, ValidationRequest, ValidationVerdict,
};

/// How the mock answers `validate_payment`.
#[derive(Debug, Clone, Copy, Default)]
pub enum VerdictBehavior {
    /// Verdict `success: true`.
    #[default]
    Accept,
    /// Verdict `success: false`.
    Reject,
    /// Transport-level failure (HTTP 502).
    Fail,
}

#[derive(Default)]
struct MockInner {
    carts: Mutex<HashMap<String, Vec<CartRow>>>,
    orders: Mutex<HashMap<String, Vec<OrderRecord>>>,
    products: Mutex<HashMap<String, ProductRecord>>,
    session_url: Mutex<Option<String>>,
    verdict: Mutex<VerdictBehavior>,
    payment_requests: Mutex<Vec<PaymentRequest>>,
    validation_requests: Mutex<Vec<ValidationRequest>>,
}

/// In-memory stand-in for the commerce REST backend.
///
/// Clones share state, so keep one handle for assertions and give the
/// other to the service under test.
#[derive(Clone, Default)]
pub struct MockBackend {
    inner: Arc<MockInner>,
}

impl MockBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_cart(self, email: &str, rows: Vec<CartRow>) -> Self {
        self.inner
            .carts
            .lock()
            .unwrap()
            .insert(email.to_string(), rows);
        self
    }

    #[must_use]
    pub fn with_orders(self, email: &str, records: Vec<OrderRecord>) -> Self {
        self.inner
            .orders
            .lock()
            .unwrap()
            .insert(email.to_string(), records);
        self
    }

    #[must_use]
    pub fn with_product(self, product: ProductRecord) -> Self {
        self.inner
            .products
            .lock()
            .unwrap()
            .insert(product.id.clone(), product);
        self
    }

    #[must_use]
    pub fn with_session_url(self, url: &str) -> Self {
        *self.inner.session_url.lock().unwrap() = Some(url.to_string());
        self
    }

    #[must_use]
    pub fn with_verdict(self, behavior: VerdictBehavior) -> Self {
        *self.inner.verdict.lock().unwrap() = behavior;
        self
    }

    /// Every payment request the mock has seen, in order.
    #[must_use]
    pub fn payment_requests(&self) -> Vec<PaymentRequest> {
        self.inner.payment_requests.lock().unwrap().clone()
    }

    /// Number of `validate_payment` calls made so far.
    #[must_use]
    pub fn validation_calls(&self) -> usize {
        self.inner.validation_requests.lock().unwrap().len()
    }

    /// Every validation request the mock has seen, in order.
    #[must_use]
    pub fn validation_requests(&self) -> Vec<ValidationRequest> {
        self.inner.validation_requests.lock().unwrap().clone()
    }
}

impl CommerceApi for MockBackend {
    async fn fetch_cart(&self, email: &Email) -> Result<Vec<CartRow>, BackendError> {
        Ok(self
            .inner
            .carts
            .lock()
            .unwrap()
            .get(email.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_orders(&self, email: &Email) -> Result<Vec<OrderRecord>, BackendError> {
        Ok(self
            .inner
            .orders
            .lock()
            .unwrap()
            .get(email.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_product(&self, id: &ProductId) -> Result<ProductRecord, BackendError> {
        self.inner
            .products
            .lock()
            .unwrap()
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("product {id}")))
    }

    async fn create_payment_session(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentSession, BackendError> {
        self.inner
            .payment_requests
            .lock()
            .unwrap()
            .push(request.clone());
        Ok(PaymentSession {
            url: self.inner.session_url.lock().unwrap().clone(),
        })
    }

    async fn validate_payment(
        &self,
        request: &ValidationRequest,
    ) -> Result<ValidationVerdict, BackendError> {
        self.inner
            .validation_requests
            .lock()
            .unwrap()
            .push(request.clone());
        match *self.inner.verdict.lock().unwrap() {
            VerdictBehavior::Accept => Ok(ValidationVerdict {
                success: true,
                message: None,
            }),
            VerdictBehavior::Reject => Ok(ValidationVerdict {
                success: false,
                message: Some("validation rejected".to_string()),
            }),
            VerdictBehavior::Fail => Err(BackendError::Status {
                status: 502,
                message: "gateway unavailable".to_string(),
            }),
        }
    }
}

/// Fixture builders for scenario tests.
pub mod fixtures {
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;
    use warium_core::Email;
    use warium_storefront::backend::{CartRow, OrderRecord, ProductRecord};
    use warium_storefront::checkout::BillingDetails;

    /// A fresh email address per call, so tests cannot collide on
    /// shared mock state.
    #[must_use]
    pub fn unique_email() -> Email {
        Email::parse(&format!("test-{}@example.com", Uuid::new_v4())).unwrap()
    }

    #[must_use]
    pub fn cart_row(id: &str, product_id: &str, name: &str, price: Decimal, quantity: u32) -> CartRow {
        CartRow {
            id: id.to_string(),
            product_main_id: Some(product_id.to_string()),
            product_name: name.to_string(),
            price,
            quantity,
            images: vec![vec![format!("https://cdn.example.com/{id}.jpg")]],
            size: None,
            color: None,
        }
    }

    #[must_use]
    pub fn product(id: &str, name: &str, price: Decimal) -> ProductRecord {
        ProductRecord {
            id: id.to_string(),
            name: name.to_string(),
            price,
            images: vec![vec![format!("https://cdn.example.com/{id}.jpg")]],
        }
    }

    #[must_use]
    pub fn order_record(
        id: &str,
        email: &Email,
        price: Decimal,
        status: &str,
        transaction_id: Option<&str>,
        menu_item_ids: &[&str],
    ) -> OrderRecord {
        OrderRecord {
            id: id.to_string(),
            email: Some(email.as_str().to_string()),
            price,
            transaction_id: transaction_id.map(str::to_string),
            date: fixed_date(),
            status: Some(status.to_string()),
            cart_ids: Vec::new(),
            menu_item_ids: menu_item_ids.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// 2024-01-22 10:30:00 UTC, the date used across history fixtures.
    #[must_use]
    pub fn fixed_date() -> Option<DateTime<Utc>> {
        Utc.with_ymd_and_hms(2024, 1, 22, 10, 30, 0).single()
    }

    /// Complete billing details that pass validation.
    #[must_use]
    pub fn billing() -> BillingDetails {
        BillingDetails {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            phone: "01700000000".to_string(),
            address: "12 Analytical Row".to_string(),
            city: "Dhaka".to_string(),
            postcode: "1207".to_string(),
            country: "Bangladesh".to_string(),
        }
    }
}
