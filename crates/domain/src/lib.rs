//! Write path for the order ledger.
//!
//! This crate provides:
//! - Checkout payload types accepting the storefront wire format
//! - Shipping address resolution from raw or structured input
//! - The [`OrderLedger`] service: checkout, guest checkout, lifecycle
//!   updates, cancellation, lookups, and paginated listing

pub mod address;
pub mod checkout;
pub mod error;
pub mod service;

pub use address::{AddressInput, resolve_shipping_address};
pub use checkout::{CheckoutPayload, LineItemInput, RecipientInput};
pub use error::{DomainError, Result};
pub use service::{CheckoutOutcome, OrderDetail, OrderLedger, OrderView};
