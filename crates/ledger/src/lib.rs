//! Order data model and persistence for the order ledger.
//!
//! This crate owns the persisted shape of an order:
//! - [`CustomerRef`] — the tagged registered-or-guest identity of a purchaser
//! - [`Order`], [`LineItem`], [`RecipientInfo`] — the order document
//! - [`OrderStatus`] / [`PaymentStatus`] / [`PaymentMethod`] state machines
//! - [`OrderStore`] — the storage seam, with in-memory and PostgreSQL backends

mod identity;
mod memory;
mod order;
mod postgres;
mod status;
mod store;

pub use common::{AccountId, Money, OrderId};
pub use identity::CustomerRef;
pub use memory::InMemoryOrderStore;
pub use order::{LineItem, Order, OrderPatch, RecipientInfo};
pub use postgres::PostgresOrderStore;
pub use status::{OrderStatus, PaymentMethod, PaymentStatus};
pub use store::{
    OrderFilter, OrderStore, PageRequest, PageResult, Result, SortField, SortOrder, StoreError,
};
