//! Application-level error handling for the storefront.
//!
//! Gateway declines are deliberately not represented here: a declined or
//! errored payment resolves to a terminal [`crate::payment::Resolution`]
//! state rather than an error, since the user is shown a result page
//! either way.

use thiserror::Error;

use crate::backend::BackendError;
use crate::checkout::ValidationError;
use crate::config::ConfigError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Backend request failed (transport, non-2xx, or malformed body).
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Billing details incomplete; submission blocked.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration failed to load.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Payment session was created but the response carried no redirect URL.
    #[error("payment session returned no redirect URL")]
    MissingRedirect,
}

/// Result type alias for `StorefrontError`.
pub type Result<T, E = StorefrontError> = std::result::Result<T, E>;
