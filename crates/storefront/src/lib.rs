//! Warium Storefront library.
//!
//! Customer-facing commerce core: cart state, checkout totals and order
//! intents, payment status resolution, and order history. The rendering
//! layer lives in the host application; this crate provides the logic and
//! the REST backend client it drives.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod orders;
pub mod payment;
pub mod services;
