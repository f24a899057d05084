//! Report shapes returned by the aggregation engine.

use common::Money;
use serde::Serialize;

/// Dashboard headline numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    pub total_products: u64,
    pub total_categories: u64,
    pub total_roles: u64,
    pub total_customers: u64,
    pub total_orders: u64,
    pub total_revenue: Money,
}

/// Revenue over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueReport {
    pub total_revenue: Money,
    pub total_orders: u64,
}

/// One month's bucket in the revenue trend. Months with no orders are not
/// emitted, so consumers must not assume a dense series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRevenue {
    pub year: i32,
    pub month: u32,
    pub total_orders: u64,
    pub total_revenue: Money,
}

/// One row of the top-customer ranking.
///
/// `name` and `email` are present only when the bucket's identity value
/// resolved to an account; guest buckets rank undecorated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopCustomer {
    pub customer_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    pub order_count: u64,
    pub total_revenue: Money,
}
