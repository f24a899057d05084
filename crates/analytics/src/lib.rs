//! Read-only analytics over the order ledger.
//!
//! The [`AggregationEngine`] computes point-in-time reports from the
//! persisted orders: summary counts, revenue in a date range, the monthly
//! trend, and the top-customer ranking that has to stay correct across both
//! identity shapes sharing the ledger's single customer field.

pub mod engine;
pub mod error;
pub mod reports;

pub use engine::AggregationEngine;
pub use error::{AnalyticsError, Result};
pub use reports::{MonthlyRevenue, RevenueReport, SummaryReport, TopCustomer};
