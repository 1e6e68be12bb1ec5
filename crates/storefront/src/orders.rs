//! Order history presentation.
//!
//! Turns raw backend order records into display-ready entries: short
//! references, humanized dates, badge styling per status, and the
//! products bought. Anything the backend left blank degrades to "N/A"
//! rather than hiding the order.

use warium_core::{CurrencyCode, Money, OrderId, OrderStatus, ProductId};

use crate::backend::{OrderRecord, ProductRecord};
use crate::cart::PLACEHOLDER_IMAGE;

/// Badge label and tone class for an order status.
///
/// Unrecognized or missing statuses render as "Unknown" instead of
/// being dropped from the list.
#[must_use]
pub const fn status_badge(status: Option<OrderStatus>) -> (&'static str, &'static str) {
    match status {
        Some(OrderStatus::Success) => ("Completed", "badge-success"),
        Some(OrderStatus::Pending) => ("Pending", "badge-warning"),
        Some(OrderStatus::Processing) => ("Processing", "badge-info"),
        Some(OrderStatus::Failed) => ("Failed", "badge-error"),
        None => ("Unknown", "badge-neutral"),
    }
}

/// One order in the customer's history, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub order_id: OrderId,
    /// Transaction id when assigned, else the first eight characters of
    /// the order id, else "N/A".
    pub reference: String,
    /// Order date as "Jan 22, 2024", or "N/A" when unparseable.
    pub placed_at: String,
    /// Grand total, rounded and formatted with the currency symbol.
    pub amount: String,
    pub status: Option<OrderStatus>,
    pub status_label: &'static str,
    pub status_badge: &'static str,
    pub products: Vec<ProductSummary>,
}

/// A product bought in a past order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub price: String,
    pub image_url: String,
}

impl ProductSummary {
    fn from_record(record: &ProductRecord, currency: CurrencyCode) -> Self {
        let image_url = record
            .first_image()
            .map_or_else(|| PLACEHOLDER_IMAGE.to_string(), str::to_string);
        Self {
            id: ProductId::new(record.id.clone()),
            name: record.name.clone(),
            price: Money::new(record.price, currency).rounded().display(),
            image_url,
        }
    }
}

impl HistoryEntry {
    /// Build a display entry from an order record and its expanded
    /// products.
    #[must_use]
    pub fn from_record(
        record: &OrderRecord,
        products: &[ProductRecord],
        currency: CurrencyCode,
    ) -> Self {
        let reference = record
            .transaction_id
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .or_else(|| {
                let short: String = record.id.chars().take(8).collect();
                (!short.is_empty()).then_some(short)
            })
            .unwrap_or_else(|| "N/A".to_string());

        let placed_at = record
            .date
            .map_or_else(|| "N/A".to_string(), |d| d.format("%b %-d, %Y").to_string());

        let status = record
            .status
            .as_deref()
            .and_then(|s| s.parse::<OrderStatus>().ok());
        let (status_label, status_badge) = status_badge(status);

        Self {
            order_id: OrderId::new(record.id.clone()),
            reference,
            placed_at,
            amount: Money::new(record.price, currency).rounded().display(),
            status,
            status_label,
            status_badge,
            products: products
                .iter()
                .map(|p| ProductSummary::from_record(p, currency))
                .collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::*;

    fn record(id: &str) -> OrderRecord {
        OrderRecord {
            id: id.to_string(),
            email: Some("ada@example.com".to_string()),
            price: Decimal::new(19200, 2),
            transaction_id: None,
            date: Utc.with_ymd_and_hms(2024, 1, 22, 10, 30, 0).single(),
            status: Some("pending".to_string()),
            cart_ids: Vec::new(),
            menu_item_ids: Vec::new(),
        }
    }

    #[test]
    fn test_status_badge_mapping() {
        assert_eq!(
            status_badge(Some(OrderStatus::Success)),
            ("Completed", "badge-success")
        );
        assert_eq!(
            status_badge(Some(OrderStatus::Pending)),
            ("Pending", "badge-warning")
        );
        assert_eq!(
            status_badge(Some(OrderStatus::Processing)),
            ("Processing", "badge-info")
        );
        assert_eq!(
            status_badge(Some(OrderStatus::Failed)),
            ("Failed", "badge-error")
        );
        assert_eq!(status_badge(None), ("Unknown", "badge-neutral"));
    }

    #[test]
    fn test_reference_prefers_transaction_id() {
        let mut rec = record("64b1f0aa9c3d2e0001a7b5c4");
        rec.transaction_id = Some("tx-4481".to_string());

        let entry = HistoryEntry::from_record(&rec, &[], CurrencyCode::USD);
        assert_eq!(entry.reference, "tx-4481");
    }

    #[test]
    fn test_reference_falls_back_to_short_order_id() {
        let entry = HistoryEntry::from_record(
            &record("64b1f0aa9c3d2e0001a7b5c4"),
            &[],
            CurrencyCode::USD,
        );
        assert_eq!(entry.reference, "64b1f0aa");
    }

    #[test]
    fn test_reference_ignores_empty_transaction_id() {
        let mut rec = record("64b1f0aa9c3d2e0001a7b5c4");
        rec.transaction_id = Some(String::new());

        let entry = HistoryEntry::from_record(&rec, &[], CurrencyCode::USD);
        assert_eq!(entry.reference, "64b1f0aa");
    }

    #[test]
    fn test_reference_na_when_nothing_available() {
        let entry = HistoryEntry::from_record(&record(""), &[], CurrencyCode::USD);
        assert_eq!(entry.reference, "N/A");
    }

    #[test]
    fn test_date_formatting() {
        let entry = HistoryEntry::from_record(&record("o1"), &[], CurrencyCode::USD);
        assert_eq!(entry.placed_at, "Jan 22, 2024");

        let mut rec = record("o1");
        rec.date = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).single();
        let entry = HistoryEntry::from_record(&rec, &[], CurrencyCode::USD);
        assert_eq!(entry.placed_at, "Jan 2, 2024");

        rec.date = None;
        let entry = HistoryEntry::from_record(&rec, &[], CurrencyCode::USD);
        assert_eq!(entry.placed_at, "N/A");
    }

    #[test]
    fn test_amount_is_rounded_and_symbolized() {
        let mut rec = record("o1");
        rec.price = Decimal::new(80125, 3); // 80.125
        let entry = HistoryEntry::from_record(&rec, &[], CurrencyCode::USD);
        assert_eq!(entry.amount, "$80.13");
    }

    #[test]
    fn test_unrecognized_status_renders_unknown() {
        let mut rec = record("o1");
        rec.status = Some("shipped-ish".to_string());

        let entry = HistoryEntry::from_record(&rec, &[], CurrencyCode::USD);
        assert_eq!(entry.status, None);
        assert_eq!(entry.status_label, "Unknown");
        assert_eq!(entry.status_badge, "badge-neutral");
    }

    #[test]
    fn test_products_use_placeholder_when_imageless() {
        let products = vec![ProductRecord {
            id: "p1".to_string(),
            name: "Mug".to_string(),
            price: Decimal::new(56, 0),
            images: Vec::new(),
        }];

        let entry = HistoryEntry::from_record(&record("o1"), &products, CurrencyCode::USD);
        let product = entry.products.first().unwrap();
        assert_eq!(product.image_url, PLACEHOLDER_IMAGE);
        assert_eq!(product.price, "$56.00");
    }
}
