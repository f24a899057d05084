//! Collaborator service traits and in-memory implementations.
//!
//! The order ledger talks to the rest of the platform through these seams:
//! account lookups, stock adjustments, catalog queries, and order
//! notifications. Each trait ships with an in-memory implementation used in
//! tests and standalone deployments.

pub mod accounts;
pub mod catalog;
pub mod error;
pub mod notify;
pub mod stock;

pub use accounts::{AccountProfile, AccountStore, InMemoryAccountStore};
pub use catalog::{CatalogService, InMemoryCatalogService, ProductSales, ProductSummary};
pub use error::{Result, ServiceError};
pub use notify::{InMemoryNotificationSender, NotificationSender, OrderNotification};
pub use stock::{InMemoryStockService, StockService};
