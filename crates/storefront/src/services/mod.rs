//! High-level storefront flows built on the backend client.
//!
//! Each service holds a backend handle and returns plain values. None
//! of them write to shared state across an await point, so dropping an
//! in-flight future (the customer navigates away, a request times out)
//! leaves the cart and the order book exactly as they were.

pub mod cart;
pub mod checkout;
pub mod history;

pub use cart::CartService;
pub use checkout::CheckoutService;
pub use history::HistoryService;
