//! Status enums shared across components.
//!
//! [`OrderStatus`] is the canonical vocabulary the core logic reasons
//! over. Upstream systems use wider or differently-spelled sets; those are
//! mapped into this one at the boundary where they enter, and mapped out
//! to display labels at the presentation edge.

use serde::{Deserialize, Serialize};

/// Canonical order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created but not yet paid; every new order starts here.
    #[default]
    Pending,
    Processing,
    /// Payment confirmed.
    Success,
    /// Payment declined, errored, or cancelled.
    Failed,
}

impl OrderStatus {
    /// The wire token for this status (matches the serde representation).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }

    /// Whether the order has reached a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Whether payment has been captured for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unpaid => write!(f, "unpaid"),
            Self::Paid => write!(f, "paid"),
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "paid" => Ok(Self::Paid),
            "unpaid" => Ok(Self::Unpaid),
            _ => Err(format!("invalid payment status: {s}")),
        }
    }
}
