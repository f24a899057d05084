//! Shared types used across the order ledger crates.

mod types;

pub use types::{AccountId, InvalidAccountId, Money, OrderId};
