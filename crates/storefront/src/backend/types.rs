//! Wire types for the commerce REST backend.
//!
//! Upstream rows are loosely typed: prices arrive as strings or numbers,
//! quantities go missing, image lists nest one level deeper than you
//! would expect. Deserialization here is deliberately lenient for the
//! numeric fields; a malformed price coerces to zero and a malformed
//! quantity to one instead of failing the whole payload.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use warium_core::{CartItemId, CurrencyCode, OrderStatus, ProductId};

use crate::cart::{CartLineItem, PLACEHOLDER_IMAGE};
use crate::checkout::OrderIntent;

// =============================================================================
// Incoming Rows
// =============================================================================

/// One cart entry as stored by the backend (`GET /carts?email=`).
#[derive(Debug, Clone, Deserialize)]
pub struct CartRow {
    #[serde(rename = "_id")]
    pub id: String,
    /// The product backing this entry; absent on legacy rows.
    #[serde(rename = "ProductMainID", default)]
    pub product_main_id: Option<String>,
    #[serde(rename = "productName", default)]
    pub product_name: String,
    /// Coerced: strings parse, garbage and negatives become zero.
    #[serde(default, deserialize_with = "de_lenient_price")]
    pub price: Decimal,
    /// Coerced: strings parse, garbage and missing become one.
    #[serde(default = "default_quantity", deserialize_with = "de_lenient_quantity")]
    pub quantity: u32,
    /// Nested image groups; the first URL of the first group is shown.
    #[serde(default)]
    pub images: Vec<Vec<String>>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl CartRow {
    /// First image URL, if the row carries any.
    #[must_use]
    pub fn first_image(&self) -> Option<&str> {
        first_image(&self.images)
    }
}

impl From<CartRow> for CartLineItem {
    fn from(row: CartRow) -> Self {
        let image_url = row
            .first_image()
            .map_or_else(|| PLACEHOLDER_IMAGE.to_string(), str::to_string);
        Self {
            id: CartItemId::new(row.id),
            product_id: ProductId::new(row.product_main_id.unwrap_or_default()),
            name: row.product_name,
            unit_price: row.price,
            quantity: row.quantity,
            selected_size: row.size,
            selected_color: row.color,
            image_url,
        }
    }
}

/// One order as returned by the history endpoint (`GET /orders?email=`).
#[derive(Debug, Clone, Deserialize)]
pub struct OrderRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Grand total charged for the order.
    #[serde(default, deserialize_with = "de_lenient_price")]
    pub price: Decimal,
    /// Empty until the gateway assigns one.
    #[serde(rename = "transactionId", default)]
    pub transaction_id: Option<String>,
    /// Unparseable dates are dropped rather than failing the list.
    #[serde(default, deserialize_with = "de_lenient_datetime")]
    pub date: Option<DateTime<Utc>>,
    /// Raw status token; mapped to the canonical set at presentation.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "cartIds", default)]
    pub cart_ids: Vec<String>,
    #[serde(rename = "menuItemIds", default)]
    pub menu_item_ids: Vec<String>,
}

/// A product as returned by `GET /products/:id`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "productName", default)]
    pub name: String,
    #[serde(default, deserialize_with = "de_lenient_price")]
    pub price: Decimal,
    #[serde(default)]
    pub images: Vec<Vec<String>>,
}

impl ProductRecord {
    /// First image URL, if the product carries any.
    #[must_use]
    pub fn first_image(&self) -> Option<&str> {
        first_image(&self.images)
    }
}

// =============================================================================
// Payment Bodies
// =============================================================================

/// Body of `POST /create-ssl-payment`, the serialized order intent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub email: String,
    /// Grand total, already rounded to two decimal places.
    pub price: Decimal,
    /// Always empty at submission; the gateway assigns the real one.
    pub transaction_id: String,
    pub date: DateTime<Utc>,
    /// Always `pending` at submission.
    pub status: OrderStatus,
    pub cart_ids: Vec<String>,
    pub menu_item_ids: Vec<String>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub customer_city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_postcode: Option<String>,
    pub customer_country: String,
    pub currency: CurrencyCode,
}

impl From<&OrderIntent> for PaymentRequest {
    fn from(intent: &OrderIntent) -> Self {
        Self {
            email: intent.customer_email.as_str().to_string(),
            price: intent.total_amount,
            transaction_id: String::new(),
            date: intent.created_at,
            status: intent.status,
            cart_ids: intent
                .line_item_refs
                .iter()
                .map(|r| r.cart_item_id.as_str().to_string())
                .collect(),
            menu_item_ids: intent
                .line_item_refs
                .iter()
                .map(|r| r.product_id.as_str().to_string())
                .collect(),
            customer_name: intent.customer_name.clone(),
            customer_phone: intent.customer_phone.clone(),
            customer_address: intent.shipping_address.line1.clone(),
            customer_city: intent.shipping_address.city.clone(),
            customer_postcode: intent.shipping_address.postal_code.clone(),
            customer_country: intent.shipping_address.country.clone(),
            currency: intent.currency,
        }
    }
}

/// Response of `POST /create-ssl-payment`.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentSession {
    /// Gateway page to hand the customer off to; absent on failure.
    #[serde(default)]
    pub url: Option<String>,
}

/// Body of `POST /success-payment`, the gateway callback ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationRequest {
    pub val_id: String,
    pub tran_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_tran_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Verdict of `POST /success-payment`.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationVerdict {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Lenient Deserialization
// =============================================================================

fn first_image(images: &[Vec<String>]) -> Option<&str> {
    images
        .first()
        .and_then(|group| group.first())
        .map(String::as_str)
}

const fn default_quantity() -> u32 {
    1
}

fn de_lenient_price<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(coerce_price(&value))
}

fn de_lenient_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(coerce_quantity(&value))
}

fn de_lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        _ => None,
    })
}

fn coerce_price(value: &serde_json::Value) -> Decimal {
    let parsed = match value {
        serde_json::Value::Number(n) => n.to_string().parse().unwrap_or(Decimal::ZERO),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    };
    // Prices are non-negative by contract; a negative row is bad data.
    parsed.max(Decimal::ZERO)
}

fn coerce_quantity(value: &serde_json::Value) -> u32 {
    match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .and_then(|q| u32::try_from(q).ok())
            .unwrap_or(1),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(1),
        _ => 1,
    }
}
