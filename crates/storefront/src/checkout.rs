//! Checkout totals and order-intent building.
//!
//! Everything in this module is a pure derivation over a cart snapshot
//! plus externally supplied billing and delivery inputs. Amounts stay at
//! full precision while accumulating; rounding to two decimal places
//! happens once, when an intent is built for transmission or a total is
//! formatted for display.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use warium_core::{CartItemId, CurrencyCode, Email, OrderStatus, ProductId};

use crate::cart::CartLineItem;

// =============================================================================
// Totals
// =============================================================================

/// Delivery pricing selector chosen by the customer at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    /// No delivery charge.
    #[default]
    Free,
    /// Flat-rate paid delivery.
    Flat,
}

/// Which surcharge applies on top of the cart subtotal.
///
/// The two policies are mutually exclusive; configuration selects exactly
/// one per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurchargePolicy {
    /// A fixed charge added when the customer picks paid delivery;
    /// free delivery always yields zero.
    Delivery { flat_rate: Decimal },
    /// Value-added tax as a fraction of the subtotal, regardless of
    /// delivery method.
    Vat { rate: Decimal },
}

impl SurchargePolicy {
    /// Compute the surcharge for a subtotal under this policy.
    #[must_use]
    pub fn surcharge(&self, subtotal: Decimal, method: DeliveryMethod) -> (SurchargeKind, Decimal) {
        match self {
            Self::Delivery { flat_rate } => {
                let amount = match method {
                    DeliveryMethod::Flat => *flat_rate,
                    DeliveryMethod::Free => Decimal::ZERO,
                };
                (SurchargeKind::Delivery, amount)
            }
            Self::Vat { rate } => (SurchargeKind::Vat, subtotal * *rate),
        }
    }
}

/// Labels which policy produced a surcharge, for summary captions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurchargeKind {
    Delivery,
    Vat,
}

impl SurchargeKind {
    /// Caption for the order summary line.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Delivery => "Delivery Charges",
            Self::Vat => "VAT",
        }
    }
}

/// Derived totals for the current cart snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutTotals {
    pub subtotal: Decimal,
    pub surcharge_kind: SurchargeKind,
    pub surcharge: Decimal,
    /// Always `subtotal + surcharge`.
    pub total: Decimal,
    pub currency: CurrencyCode,
}

impl CheckoutTotals {
    /// Round for presentation or transmission.
    ///
    /// Subtotal and surcharge are rounded to two decimal places and the
    /// total re-derived from the rounded parts, so the
    /// `total == subtotal + surcharge` identity survives rounding.
    #[must_use]
    pub fn rounded(&self) -> Self {
        let subtotal = round2(self.subtotal);
        let surcharge = round2(self.surcharge);
        Self {
            subtotal,
            surcharge_kind: self.surcharge_kind,
            surcharge,
            total: subtotal + surcharge,
            currency: self.currency,
        }
    }
}

/// Compute subtotal, surcharge, and total for a cart snapshot.
///
/// `subtotal` is the exact sum of `unit_price * quantity` over the
/// snapshot. Upstream string-typed or missing numerics are already
/// coerced at the wire boundary (see `backend::types`), so line items
/// here always carry well-formed numbers.
#[must_use]
pub fn compute_totals(
    items: &[CartLineItem],
    method: DeliveryMethod,
    policy: SurchargePolicy,
    currency: CurrencyCode,
) -> CheckoutTotals {
    let subtotal: Decimal = items.iter().map(CartLineItem::line_total).sum();
    let (surcharge_kind, surcharge) = policy.surcharge(subtotal, method);
    CheckoutTotals {
        subtotal,
        surcharge_kind,
        surcharge,
        total: subtotal + surcharge,
        currency,
    }
}

/// Round to the two-decimal transmission form.
///
/// Rescales after rounding so whole-number amounts serialize as
/// "192.00" rather than "192".
fn round2(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

// =============================================================================
// Billing Validation
// =============================================================================

/// Required billing fields, in the order they are validated and reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingField {
    FirstName,
    LastName,
    Phone,
    Address,
    City,
    Country,
}

impl BillingField {
    /// Human-readable field name for error messages.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::FirstName => "first name",
            Self::LastName => "last name",
            Self::Phone => "phone",
            Self::Address => "address",
            Self::City => "city",
            Self::Country => "country",
        }
    }
}

/// Billing form fields as entered by the customer.
///
/// `postcode` is the only optional field; everything else must be
/// non-empty after trimming before an order intent can be built.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillingDetails {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postcode: String,
    pub country: String,
}

impl BillingDetails {
    /// Check that every required field is non-empty after trimming.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing exactly the missing fields,
    /// in declaration order.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let required = [
            (BillingField::FirstName, &self.first_name),
            (BillingField::LastName, &self.last_name),
            (BillingField::Phone, &self.phone),
            (BillingField::Address, &self.address),
            (BillingField::City, &self.city),
            (BillingField::Country, &self.country),
        ];

        let missing: Vec<BillingField> = required
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| field)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { missing })
        }
    }

    /// Customer display name: "first last", trimmed.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

/// Billing details incomplete; no intent is built and nothing is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required billing fields: {}", format_missing_fields(.missing))]
pub struct ValidationError {
    /// The required fields whose trimmed value was empty.
    pub missing: Vec<BillingField>,
}

fn format_missing_fields(missing: &[BillingField]) -> String {
    missing
        .iter()
        .map(|field| field.label())
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// Order Intent
// =============================================================================

/// Shipping destination captured from the billing form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub line1: String,
    pub city: String,
    pub postal_code: Option<String>,
    pub country: String,
}

/// Reference from an order intent back to the cart line it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemRef {
    pub cart_item_id: CartItemId,
    pub product_id: ProductId,
}

/// The computed, immutable payload submitted to initiate a payment.
///
/// Built as a one-way snapshot of the cart at submission time; totals are
/// recomputed from the live snapshot, never trusted from stale UI state.
/// After submission the status is owned by the backend and gateway; the
/// client only ever sets the initial `pending`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub customer_email: Email,
    pub customer_name: String,
    pub customer_phone: String,
    pub shipping_address: ShippingAddress,
    /// (cart item, product) pairs preserving cart order.
    pub line_item_refs: Vec<LineItemRef>,
    pub delivery_method: DeliveryMethod,
    /// Rounded to two decimal places for transmission.
    pub subtotal: Decimal,
    /// Surcharge on top of the subtotal; carries the VAT amount when that
    /// policy is active.
    pub delivery_charge: Decimal,
    /// Always `subtotal + delivery_charge`.
    pub total_amount: Decimal,
    pub currency: CurrencyCode,
    /// Always [`OrderStatus::Pending`] at creation.
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Validate billing details and build an [`OrderIntent`] from the live
/// cart snapshot.
///
/// Totals are recomputed here, at the moment of submission, and rounded
/// to two decimal places for transmission.
///
/// # Errors
///
/// Returns a [`ValidationError`] naming every missing required billing
/// field; in that case no intent exists and nothing has been sent.
pub fn build_order_intent(
    snapshot: &[CartLineItem],
    method: DeliveryMethod,
    policy: SurchargePolicy,
    currency: CurrencyCode,
    customer_email: Email,
    billing: &BillingDetails,
) -> Result<OrderIntent, ValidationError> {
    billing.validate()?;

    let totals = compute_totals(snapshot, method, policy, currency).rounded();
    let postcode = billing.postcode.trim();

    Ok(OrderIntent {
        customer_email,
        customer_name: billing.full_name(),
        customer_phone: billing.phone.trim().to_string(),
        shipping_address: ShippingAddress {
            line1: billing.address.trim().to_string(),
            city: billing.city.trim().to_string(),
            postal_code: (!postcode.is_empty()).then(|| postcode.to_string()),
            country: billing.country.trim().to_string(),
        },
        line_item_refs: snapshot
            .iter()
            .map(|item| LineItemRef {
                cart_item_id: item.id.clone(),
                product_id: item.product_id.clone(),
            })
            .collect(),
        delivery_method: method,
        subtotal: totals.subtotal,
        delivery_charge: totals.surcharge,
        total_amount: totals.total,
        currency,
        status: OrderStatus::Pending,
        created_at: Utc::now(),
    })
}
