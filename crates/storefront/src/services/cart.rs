//! Cart hydration from the backend.

use tracing::instrument;
use warium_core::Email;

use crate::backend::CommerceApi;
use crate::cart::{CartLineItem, CartStore};
use crate::error::Result;

/// Loads a customer's saved cart into a [`CartStore`].
pub struct CartService<B: CommerceApi> {
    backend: B,
}

impl<B: CommerceApi> CartService<B> {
    #[must_use]
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Fetch the customer's saved cart rows and build a store from them.
    ///
    /// Backend rows are coerced into line items on the way in; rows
    /// with a zero quantity are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self))]
    pub async fn load(&self, email: &Email) -> Result<CartStore> {
        let rows = self.backend.fetch_cart(email).await?;
        let items: Vec<CartLineItem> = rows.into_iter().map(CartLineItem::from).collect();
        Ok(CartStore::from_items(items))
    }
}
