//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `WARIUM_BACKEND_URL` - Base URL of the commerce REST backend
//!
//! ## Optional
//! - `WARIUM_CURRENCY` - ISO 4217 currency code for totals (default: USD)
//! - `WARIUM_SURCHARGE_POLICY` - `delivery` or `vat` (default: delivery)
//! - `WARIUM_DELIVERY_CHARGE` - Flat delivery rate (default: 80)
//! - `WARIUM_VAT_RATE` - VAT fraction of subtotal (default: 0.20)
//! - `WARIUM_HTTP_TIMEOUT_SECS` - Backend request timeout (default: 10)

use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;
use url::Url;
use warium_core::CurrencyCode;

use crate::checkout::SurchargePolicy;

/// Default flat delivery charge in currency units.
const DEFAULT_DELIVERY_CHARGE: Decimal = Decimal::from_parts(80, 0, 0, false, 0);

/// Default VAT rate as a fraction of the subtotal (20%).
const DEFAULT_VAT_RATE: Decimal = Decimal::from_parts(20, 0, 0, false, 2);

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the commerce REST backend, without trailing slash.
    pub backend_url: String,
    /// Currency attached to every computed total and order intent.
    pub currency: CurrencyCode,
    /// Which surcharge applies on top of the cart subtotal.
    pub surcharge_policy: SurchargePolicy,
    /// Timeout for backend HTTP requests.
    pub http_timeout: Duration,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or any
    /// variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let backend_url =
            normalize_backend_url("WARIUM_BACKEND_URL", &get_required_env("WARIUM_BACKEND_URL")?)?;

        let currency = get_env_or_default("WARIUM_CURRENCY", CurrencyCode::default().code())
            .parse::<CurrencyCode>()
            .map_err(|e| ConfigError::InvalidEnvVar("WARIUM_CURRENCY".to_string(), e))?;

        let flat_rate = parse_decimal_env("WARIUM_DELIVERY_CHARGE", DEFAULT_DELIVERY_CHARGE)?;
        let vat_rate = parse_decimal_env("WARIUM_VAT_RATE", DEFAULT_VAT_RATE)?;
        let surcharge_policy = parse_surcharge_policy(
            &get_env_or_default("WARIUM_SURCHARGE_POLICY", "delivery"),
            flat_rate,
            vat_rate,
        )
        .map_err(|e| ConfigError::InvalidEnvVar("WARIUM_SURCHARGE_POLICY".to_string(), e))?;

        let http_timeout = get_env_or_default(
            "WARIUM_HTTP_TIMEOUT_SECS",
            &DEFAULT_HTTP_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| {
            ConfigError::InvalidEnvVar("WARIUM_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        Ok(Self {
            backend_url,
            currency,
            surcharge_policy,
            http_timeout,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an optional decimal environment variable, falling back to a default.
fn parse_decimal_env(key: &str, default: Decimal) -> Result<Decimal, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<Decimal>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Validate a backend base URL and strip any trailing slash.
fn normalize_backend_url(key: &str, raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme: {}", url.scheme()),
        ));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

/// Select the surcharge policy by name.
fn parse_surcharge_policy(
    kind: &str,
    flat_rate: Decimal,
    vat_rate: Decimal,
) -> Result<SurchargePolicy, String> {
    match kind.to_ascii_lowercase().as_str() {
        "delivery" => Ok(SurchargePolicy::Delivery { flat_rate }),
        "vat" => Ok(SurchargePolicy::Vat { rate: vat_rate }),
        other => Err(format!("expected 'delivery' or 'vat', got '{other}'")),
    }
}
