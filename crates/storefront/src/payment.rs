//! Payment redirect handling and status resolution.
//!
//! After checkout the customer is handed off to the payment gateway and
//! eventually redirected back to a success or failure route with a
//! query-string callback. [`StatusResolver`] turns that callback into a
//! terminal [`Resolution`]: the gateway ids are validated with the
//! backend at most once, and a failed validation is never retried.

use std::time::Duration;

use tracing::{debug, instrument, warn};
use url::Url;
use warium_core::TransactionId;

use crate::backend::{CommerceApi, ValidationRequest};

/// Message shown when the gateway fails without giving a reason of its own.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Payment gateway returned an error or the transaction was declined.";

/// How long the failure page lingers before sending the customer back.
const FAILURE_REDIRECT_DELAY: Duration = Duration::from_secs(3);

// =============================================================================
// Gateway Callback
// =============================================================================

/// Query parameters carried on a gateway redirect.
///
/// Everything is optional; gateways differ in what they send. Empty
/// values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatewayCallback {
    /// Validation handle issued by the gateway on success.
    pub val_id: Option<String>,
    /// Gateway transaction id.
    pub transaction_id: Option<String>,
    /// Bank-side transaction id, when the gateway forwards one.
    pub bank_tran_id: Option<String>,
    /// Raw gateway status token (e.g. `VALID`, `FAILED`).
    pub status: Option<String>,
    /// Human-readable failure reason from the gateway.
    pub error: Option<String>,
    /// Charged amount as the gateway reports it.
    pub amount: Option<String>,
    /// Merchant-side order reference, when echoed back.
    pub order_id: Option<String>,
    pub email: Option<String>,
}

impl GatewayCallback {
    /// Build a callback from query-string pairs.
    ///
    /// Recognizes the aliases different gateway configurations use
    /// (`tran_id`/`transaction_id`/`transactionId`, `error`/`reason`,
    /// `order_id`/`orderId`); unknown keys and empty values are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut callback = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref();
            if value.is_empty() {
                continue;
            }
            let slot = match key.as_ref() {
                "val_id" => &mut callback.val_id,
                "tran_id" | "transaction_id" | "transactionId" => &mut callback.transaction_id,
                "bank_tran_id" => &mut callback.bank_tran_id,
                "status" => &mut callback.status,
                "error" | "reason" => &mut callback.error,
                "amount" => &mut callback.amount,
                "order_id" | "orderId" => &mut callback.order_id,
                "email" => &mut callback.email,
                _ => continue,
            };
            *slot = Some(value.to_string());
        }
        callback
    }

    /// Build a callback from a redirect URL's query string.
    #[must_use]
    pub fn from_url(url: &Url) -> Self {
        Self::from_pairs(url.query_pairs())
    }

    /// The gateway's own failure indicator, shown to the customer verbatim.
    ///
    /// The `error` parameter wins; otherwise the literal `status` value
    /// counts when it spells "failed" in any casing.
    #[must_use]
    pub fn explicit_failure_reason(&self) -> Option<&str> {
        self.error.as_deref().or_else(|| {
            self.status
                .as_deref()
                .filter(|s| s.eq_ignore_ascii_case("failed"))
        })
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// Which result route the gateway redirected the customer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultRoute {
    Success,
    Failure,
}

/// Terminal outcome of a payment redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Payment confirmed, either by the backend or by an id-less
    /// redirect onto the success route.
    Success {
        transaction_id: Option<TransactionId>,
    },
    /// Payment failed or was declined.
    Failed {
        /// Shown to the customer: the gateway's reason verbatim, or
        /// [`GENERIC_FAILURE_MESSAGE`].
        reason: String,
        /// Set when the failure page should bounce the customer back
        /// to checkout after a pause.
        redirect_delay: Option<Duration>,
    },
    /// The callback was too ambiguous to call either way; the customer
    /// is pointed at their order history instead.
    Unknown,
}

/// Context displayed alongside a failure, straight from the callback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureDetails {
    pub transaction_id: Option<String>,
    pub order_id: Option<String>,
    pub amount: Option<String>,
    pub email: Option<String>,
}

impl FailureDetails {
    #[must_use]
    pub fn from_callback(callback: &GatewayCallback) -> Self {
        Self {
            transaction_id: callback.transaction_id.clone(),
            order_id: callback.order_id.clone(),
            amount: callback.amount.clone(),
            email: callback.email.clone(),
        }
    }
}

// =============================================================================
// StatusResolver
// =============================================================================

/// Resolves gateway callbacks into terminal payment outcomes.
pub struct StatusResolver<B: CommerceApi> {
    backend: B,
}

impl<B: CommerceApi> StatusResolver<B> {
    #[must_use]
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Resolve a redirect into a terminal outcome.
    ///
    /// Resolution ladder, first match wins:
    ///
    /// 1. Both `val_id` and `tran_id` present: validate with the backend.
    ///    One round trip; the verdict (or a transport error) is final.
    /// 2. An explicit failure indicator: failed, reason shown verbatim,
    ///    no backend call.
    /// 3. Exactly one of the two ids: [`Resolution::Unknown`], no call.
    /// 4. No parameters at all: trust the route the gateway picked.
    #[instrument(skip(self, callback))]
    pub async fn resolve(&self, route: ResultRoute, callback: &GatewayCallback) -> Resolution {
        let val_id = callback.val_id.as_deref().filter(|s| !s.is_empty());
        let tran_id = callback.transaction_id.as_deref().filter(|s| !s.is_empty());

        if let (Some(val_id), Some(tran_id)) = (val_id, tran_id) {
            return self.validate(route, callback, val_id, tran_id).await;
        }

        if let Some(reason) = callback.explicit_failure_reason() {
            debug!(reason, "Gateway reported an explicit failure");
            return Resolution::Failed {
                reason: reason.to_string(),
                redirect_delay: None,
            };
        }

        if val_id.is_some() || tran_id.is_some() {
            warn!("Callback carried only one of val_id and tran_id; outcome is ambiguous");
            return Resolution::Unknown;
        }

        match route {
            ResultRoute::Success => Resolution::Success {
                transaction_id: None,
            },
            ResultRoute::Failure => Resolution::Failed {
                reason: GENERIC_FAILURE_MESSAGE.to_string(),
                redirect_delay: None,
            },
        }
    }

    async fn validate(
        &self,
        route: ResultRoute,
        callback: &GatewayCallback,
        val_id: &str,
        tran_id: &str,
    ) -> Resolution {
        let request = ValidationRequest {
            val_id: val_id.to_string(),
            tran_id: tran_id.to_string(),
            bank_tran_id: callback.bank_tran_id.clone(),
            status: callback.status.clone(),
        };

        // Only the failure page bounces the customer back to checkout.
        let redirect_delay = (route == ResultRoute::Failure).then_some(FAILURE_REDIRECT_DELAY);

        match self.backend.validate_payment(&request).await {
            Ok(verdict) if verdict.success => Resolution::Success {
                transaction_id: Some(TransactionId::new(tran_id)),
            },
            Ok(verdict) => {
                debug!(message = ?verdict.message, "Backend rejected the payment");
                Resolution::Failed {
                    reason: failure_reason(callback),
                    redirect_delay,
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Payment validation request failed");
                Resolution::Failed {
                    reason: failure_reason(callback),
                    redirect_delay,
                }
            }
        }
    }
}

fn failure_reason(callback: &GatewayCallback) -> String {
    callback
        .explicit_failure_reason()
        .map_or_else(|| GENERIC_FAILURE_MESSAGE.to_string(), str::to_string)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use warium_core::{Email, ProductId};

    use super::*;
    use crate::backend::{
        BackendError, CartRow, OrderRecord, PaymentRequest, PaymentSession, ProductRecord,
        ValidationVerdict,
    };

    #[derive(Clone, Copy)]
    enum StubVerdict {
        Accept,
        Reject,
        TransportError,
    }

    struct StubBackend {
        verdict: StubVerdict,
        calls: Arc<AtomicUsize>,
    }

    impl StubBackend {
        fn new(verdict: StubVerdict) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    verdict,
                    calls: Arc::clone(&calls),
                },
                calls,
            )
        }
    }

    impl CommerceApi for StubBackend {
        async fn fetch_cart(&self, _email: &Email) -> Result<Vec<CartRow>, BackendError> {
            Ok(Vec::new())
        }

        async fn fetch_orders(&self, _email: &Email) -> Result<Vec<OrderRecord>, BackendError> {
            Ok(Vec::new())
        }

        async fn fetch_product(&self, id: &ProductId) -> Result<ProductRecord, BackendError> {
            Err(BackendError::NotFound(format!("product {id}")))
        }

        async fn create_payment_session(
            &self,
            _request: &PaymentRequest,
        ) -> Result<PaymentSession, BackendError> {
            Ok(PaymentSession { url: None })
        }

        async fn validate_payment(
            &self,
            _request: &ValidationRequest,
        ) -> Result<ValidationVerdict, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.verdict {
                StubVerdict::Accept => Ok(ValidationVerdict {
                    success: true,
                    message: None,
                }),
                StubVerdict::Reject => Ok(ValidationVerdict {
                    success: false,
                    message: Some("validation failed".to_string()),
                }),
                StubVerdict::TransportError => Err(BackendError::Status {
                    status: 502,
                    message: "bad gateway".to_string(),
                }),
            }
        }
    }

    fn callback(pairs: &[(&str, &str)]) -> GatewayCallback {
        GatewayCallback::from_pairs(pairs.iter().copied())
    }

    #[tokio::test]
    async fn test_error_param_fails_without_backend_call() {
        let (backend, calls) = StubBackend::new(StubVerdict::Accept);
        let resolver = StatusResolver::new(backend);

        let resolution = resolver
            .resolve(ResultRoute::Failure, &callback(&[("error", "Card declined")]))
            .await;

        assert_eq!(
            resolution,
            Resolution::Failed {
                reason: "Card declined".to_string(),
                redirect_delay: None,
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_both_ids_validate_success() {
        let (backend, calls) = StubBackend::new(StubVerdict::Accept);
        let resolver = StatusResolver::new(backend);

        let resolution = resolver
            .resolve(
                ResultRoute::Success,
                &callback(&[("val_id", "v-1"), ("tran_id", "tx-123")]),
            )
            .await;

        assert_eq!(
            resolution,
            Resolution::Success {
                transaction_id: Some(TransactionId::new("tx-123")),
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_validation_reject_uses_generic_message() {
        let (backend, calls) = StubBackend::new(StubVerdict::Reject);
        let resolver = StatusResolver::new(backend);

        let resolution = resolver
            .resolve(
                ResultRoute::Success,
                &callback(&[("val_id", "v-1"), ("tran_id", "tx-123")]),
            )
            .await;

        assert_eq!(
            resolution,
            Resolution::Failed {
                reason: GENERIC_FAILURE_MESSAGE.to_string(),
                redirect_delay: None,
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_validation_failure_on_failure_route_sets_delay() {
        let (backend, _calls) = StubBackend::new(StubVerdict::Reject);
        let resolver = StatusResolver::new(backend);

        let resolution = resolver
            .resolve(
                ResultRoute::Failure,
                &callback(&[("val_id", "v-1"), ("tran_id", "tx-123")]),
            )
            .await;

        assert_eq!(
            resolution,
            Resolution::Failed {
                reason: GENERIC_FAILURE_MESSAGE.to_string(),
                redirect_delay: Some(Duration::from_secs(3)),
            }
        );
    }

    #[tokio::test]
    async fn test_transport_error_prefers_callback_error_param() {
        let (backend, calls) = StubBackend::new(StubVerdict::TransportError);
        let resolver = StatusResolver::new(backend);

        let resolution = resolver
            .resolve(
                ResultRoute::Failure,
                &callback(&[
                    ("val_id", "v-1"),
                    ("tran_id", "tx-123"),
                    ("status", "failed"),
                    ("error", "Insufficient funds"),
                ]),
            )
            .await;

        assert_eq!(
            resolution,
            Resolution::Failed {
                reason: "Insufficient funds".to_string(),
                redirect_delay: Some(Duration::from_secs(3)),
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_single_id_is_unknown_without_backend_call() {
        let (backend, calls) = StubBackend::new(StubVerdict::Accept);
        let resolver = StatusResolver::new(backend);

        let resolution = resolver
            .resolve(ResultRoute::Success, &callback(&[("val_id", "v-1")]))
            .await;

        assert_eq!(resolution, Resolution::Unknown);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_params_trusts_route() {
        let (backend, calls) = StubBackend::new(StubVerdict::Accept);
        let resolver = StatusResolver::new(backend);

        let success = resolver
            .resolve(ResultRoute::Success, &GatewayCallback::default())
            .await;
        assert_eq!(
            success,
            Resolution::Success {
                transaction_id: None,
            }
        );

        let failure = resolver
            .resolve(ResultRoute::Failure, &GatewayCallback::default())
            .await;
        assert_eq!(
            failure,
            Resolution::Failed {
                reason: GENERIC_FAILURE_MESSAGE.to_string(),
                redirect_delay: None,
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_status_failed_is_shown_verbatim() {
        let (backend, calls) = StubBackend::new(StubVerdict::Accept);
        let resolver = StatusResolver::new(backend);

        let resolution = resolver
            .resolve(ResultRoute::Failure, &callback(&[("status", "FAILED")]))
            .await;

        assert_eq!(
            resolution,
            Resolution::Failed {
                reason: "FAILED".to_string(),
                redirect_delay: None,
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_explicit_failure_reason_ignores_other_statuses() {
        assert_eq!(
            callback(&[("status", "VALID")]).explicit_failure_reason(),
            None
        );
        assert_eq!(
            callback(&[("status", "failed")]).explicit_failure_reason(),
            Some("failed")
        );
    }

    #[test]
    fn test_from_url_parses_query_pairs() {
        let url =
            Url::parse("https://shop.example.com/payment/failed?tran_id=tx-9&error=Declined")
                .unwrap();
        let callback = GatewayCallback::from_url(&url);

        assert_eq!(callback.transaction_id.as_deref(), Some("tx-9"));
        assert_eq!(callback.error.as_deref(), Some("Declined"));
        assert_eq!(callback.val_id, None);
    }

    #[test]
    fn test_from_pairs_recognizes_aliases() {
        let callback = callback(&[
            ("transactionId", "tx-1"),
            ("reason", "expired card"),
            ("orderId", "o-77"),
        ]);

        assert_eq!(callback.transaction_id.as_deref(), Some("tx-1"));
        assert_eq!(callback.error.as_deref(), Some("expired card"));
        assert_eq!(callback.order_id.as_deref(), Some("o-77"));
    }

    #[test]
    fn test_empty_values_are_treated_as_absent() {
        let callback = callback(&[("val_id", ""), ("tran_id", "tx-1")]);
        assert_eq!(callback.val_id, None);
        assert_eq!(callback.transaction_id.as_deref(), Some("tx-1"));
    }

    #[test]
    fn test_failure_details_carry_callback_context() {
        let details = FailureDetails::from_callback(&callback(&[
            ("tran_id", "tx-1"),
            ("amount", "192.00"),
            ("email", "ada@example.com"),
        ]));

        assert_eq!(details.transaction_id.as_deref(), Some("tx-1"));
        assert_eq!(details.amount.as_deref(), Some("192.00"));
        assert_eq!(details.email.as_deref(), Some("ada@example.com"));
        assert_eq!(details.order_id, None);
    }
}
