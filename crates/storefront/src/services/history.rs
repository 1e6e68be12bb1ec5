//! Order history loading and product expansion.

use tracing::{instrument, warn};
use warium_core::{CurrencyCode, Email, ProductId};

use crate::backend::{CommerceApi, OrderRecord, ProductRecord};
use crate::error::Result;
use crate::orders::HistoryEntry;

/// Loads a customer's past orders as display-ready entries.
pub struct HistoryService<B: CommerceApi> {
    backend: B,
    currency: CurrencyCode,
}

impl<B: CommerceApi> HistoryService<B> {
    #[must_use]
    pub const fn new(backend: B, currency: CurrencyCode) -> Self {
        Self { backend, currency }
    }

    /// Fetch the customer's orders and expand the products bought in
    /// each one.
    ///
    /// A product that fails to load is skipped with a warning; one bad
    /// reference must not sink the whole history page.
    ///
    /// # Errors
    ///
    /// Returns an error if the order list itself cannot be fetched.
    #[instrument(skip(self))]
    pub async fn load(&self, email: &Email) -> Result<Vec<HistoryEntry>> {
        let records = self.backend.fetch_orders(email).await?;

        let mut entries = Vec::with_capacity(records.len());
        for record in &records {
            let products = self.expand_products(record).await;
            entries.push(HistoryEntry::from_record(record, &products, self.currency));
        }

        Ok(entries)
    }

    async fn expand_products(&self, record: &OrderRecord) -> Vec<ProductRecord> {
        let mut products = Vec::with_capacity(record.menu_item_ids.len());
        for id in &record.menu_item_ids {
            let product_id = ProductId::new(id.clone());
            match self.backend.fetch_product(&product_id).await {
                Ok(product) => products.push(product),
                Err(e) => {
                    warn!(
                        product_id = %product_id,
                        error = %e,
                        "Skipping product that failed to load"
                    );
                }
            }
        }
        products
    }
}
