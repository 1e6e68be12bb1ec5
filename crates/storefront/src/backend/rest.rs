//! REST client for the commerce backend.
//!
//! Uses `reqwest` 0.13 for HTTP. Products are cached using `moka`
//! (5-minute TTL); carts and orders are live state and always fetched.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use warium_core::{Email, ProductId};

use crate::backend::types::{
    CartRow, OrderRecord, PaymentRequest, PaymentSession, ProductRecord, ValidationRequest,
    ValidationVerdict,
};
use crate::backend::{BackendError, CommerceApi};
use crate::config::StorefrontConfig;

const PRODUCT_CACHE_CAPACITY: u64 = 1000;
const PRODUCT_CACHE_TTL: Duration = Duration::from_secs(300); // 5 minutes

// =============================================================================
// RestBackend
// =============================================================================

/// Client for the commerce REST backend.
///
/// Cheap to clone; all clones share the HTTP connection pool and the
/// product cache.
#[derive(Clone)]
pub struct RestBackend {
    inner: Arc<RestBackendInner>,
}

struct RestBackendInner {
    client: reqwest::Client,
    base_url: String,
    product_cache: Cache<String, ProductRecord>,
}

impl RestBackend {
    /// Create a new backend client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &StorefrontConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        let product_cache = Cache::builder()
            .max_capacity(PRODUCT_CACHE_CAPACITY)
            .time_to_live(PRODUCT_CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(RestBackendInner {
                client,
                base_url: config.backend_url.clone(),
                product_cache,
            }),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.inner.base_url)
    }
}

/// Read a response body as text first, then parse it as JSON.
///
/// Keeping the raw text around makes non-success statuses and parse
/// failures diagnosable from the logs.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
    let status = response.status();
    let response_text = response.text().await?;

    if !status.is_success() {
        tracing::error!(
            status = %status,
            body = %response_text.chars().take(500).collect::<String>(),
            "Backend returned non-success status"
        );
        return Err(BackendError::Status {
            status: status.as_u16(),
            message: response_text.chars().take(200).collect(),
        });
    }

    match serde_json::from_str(&response_text) {
        Ok(parsed) => Ok(parsed),
        Err(e) => {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            Err(BackendError::Parse(e))
        }
    }
}

impl CommerceApi for RestBackend {
    #[instrument(skip(self))]
    async fn fetch_cart(&self, email: &Email) -> Result<Vec<CartRow>, BackendError> {
        let response = self
            .inner
            .client
            .get(self.endpoint("carts"))
            .query(&[("email", email.as_str())])
            .send()
            .await?;

        read_json(response).await
    }

    #[instrument(skip(self))]
    async fn fetch_orders(&self, email: &Email) -> Result<Vec<OrderRecord>, BackendError> {
        let response = self
            .inner
            .client
            .get(self.endpoint("orders"))
            .query(&[("email", email.as_str())])
            .send()
            .await?;

        read_json(response).await
    }

    #[instrument(skip(self))]
    async fn fetch_product(&self, id: &ProductId) -> Result<ProductRecord, BackendError> {
        let cache_key = format!("product:{id}");

        if let Some(product) = self.inner.product_cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let response = self
            .inner
            .client
            .get(self.endpoint(&format!("products/{id}")))
            .send()
            .await?;

        let product: ProductRecord = read_json(response).await.map_err(|e| match e {
            BackendError::Status { status: 404, .. } => {
                BackendError::NotFound(format!("product {id}"))
            }
            other => other,
        })?;

        self.inner
            .product_cache
            .insert(cache_key, product.clone())
            .await;

        Ok(product)
    }

    #[instrument(skip(self, request))]
    async fn create_payment_session(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentSession, BackendError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("create-ssl-payment"))
            .json(request)
            .send()
            .await?;

        read_json(response).await
    }

    #[instrument(skip(self, request))]
    async fn validate_payment(
        &self,
        request: &ValidationRequest,
    ) -> Result<ValidationVerdict, BackendError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("success-payment"))
            .json(request)
            .send()
            .await?;

        read_json(response).await
    }
}
