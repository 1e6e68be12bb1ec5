//! Warium Core - Shared types library.
//!
//! This crate provides common types used across all Warium components:
//! - `storefront` - Customer-facing cart, checkout, and payment flows
//! - `vendor` - Order management dashboard for shop operators
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients,
//! no async. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
