//! Order submission to the payment backend.

use tracing::instrument;

use crate::backend::{CommerceApi, PaymentRequest};
use crate::checkout::OrderIntent;
use crate::error::{Result, StorefrontError};

/// Submits order intents and hands back the gateway redirect URL.
pub struct CheckoutService<B: CommerceApi> {
    backend: B,
}

impl<B: CommerceApi> CheckoutService<B> {
    #[must_use]
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Submit an order intent and return the gateway page to redirect
    /// the customer to.
    ///
    /// Takes `&mut self` so one service handle can have at most one
    /// submission in flight; a second click awaits the first instead of
    /// double-charging.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails or the session
    /// comes back without a redirect URL.
    #[instrument(skip(self, intent))]
    pub async fn place_order(&mut self, intent: &OrderIntent) -> Result<String> {
        let request = PaymentRequest::from(intent);
        let session = self.backend.create_payment_session(&request).await?;

        session
            .url
            .filter(|url| !url.is_empty())
            .ok_or(StorefrontError::MissingRedirect)
    }
}
