//! Commerce REST backend collaborator.
//!
//! # Architecture
//!
//! - The backend is the source of truth for carts, orders, and products;
//!   the storefront holds no local sync, only direct API calls.
//! - [`CommerceApi`] is the seam: one canonical set of operations with the
//!   data source injected as a strategy. [`RestBackend`] talks to the live
//!   REST API; tests inject in-memory implementations.
//! - Product lookups are cached in-memory via `moka` (5 minute TTL).
//! - Retry, backoff, and auth-header injection are the HTTP collaborator's
//!   concern, not this crate's; no call here is ever retried.

pub mod rest;
pub mod types;

pub use rest::RestBackend;
pub use types::{
    CartRow, OrderRecord, PaymentRequest, PaymentSession, ProductRecord, ValidationRequest,
    ValidationVerdict,
};

use thiserror::Error;
use warium_core::{Email, ProductId};

/// Errors that can occur when talking to the commerce backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend answered with a non-success status.
    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },
}

/// Operations the storefront needs from the commerce backend.
///
/// Every suspension point in the core goes through this trait: cart
/// hydration, order history, product lookups, payment session creation,
/// and payment validation.
#[allow(async_fn_in_trait)] // callers await these on one task; no Send bound needed
pub trait CommerceApi {
    /// Fetch the cart rows backing a customer's cart.
    async fn fetch_cart(&self, email: &Email) -> Result<Vec<CartRow>, BackendError>;

    /// Fetch a customer's order history.
    async fn fetch_orders(&self, email: &Email) -> Result<Vec<OrderRecord>, BackendError>;

    /// Fetch a single product for display.
    async fn fetch_product(&self, id: &ProductId) -> Result<ProductRecord, BackendError>;

    /// Submit an order intent and open a payment session.
    async fn create_payment_session(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentSession, BackendError>;

    /// Forward gateway callback ids for server-side validation.
    async fn validate_payment(
        &self,
        request: &ValidationRequest,
    ) -> Result<ValidationVerdict, BackendError>;
}
