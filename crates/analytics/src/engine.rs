//! The aggregation engine.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use common::Money;
use ledger::{CustomerRef, Order, OrderStore};
use services::{AccountStore, CatalogService, ProductSales, ProductSummary};

use crate::error::Result;
use crate::reports::{MonthlyRevenue, RevenueReport, SummaryReport, TopCustomer};

const DEFAULT_TOP_CUSTOMERS: u64 = 5;
const MAX_TOP_CUSTOMERS: u64 = 20;
const MAX_TREND_MONTHS: u32 = 24;
const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 5;
const DEFAULT_LOW_STOCK_LIMIT: u64 = 10;
const DEFAULT_TOP_SELLING: u64 = 5;

/// Read-only reports over the order ledger.
///
/// Every report is a point-in-time snapshot with no staleness guarantee
/// relative to concurrent writes.
pub struct AggregationEngine<S: OrderStore> {
    store: S,
    accounts: Arc<dyn AccountStore>,
    catalog: Arc<dyn CatalogService>,
}

impl<S: OrderStore> AggregationEngine<S> {
    /// Creates a new aggregation engine.
    pub fn new(store: S, accounts: Arc<dyn AccountStore>, catalog: Arc<dyn CatalogService>) -> Self {
        Self {
            store,
            accounts,
            catalog,
        }
    }

    /// Dashboard headline numbers: catalog and account counts plus the
    /// all-time order count and revenue, with no status filter.
    #[tracing::instrument(skip(self))]
    pub async fn summary(&self) -> Result<SummaryReport> {
        let orders = self.store.created_in_range(None, None).await?;
        let total_revenue = orders.iter().map(|order| order.total_amount).sum();

        metrics::counter!("analytics_reports_total", "report" => "summary").increment(1);
        Ok(SummaryReport {
            total_products: self.catalog.product_count().await?,
            total_categories: self.catalog.category_count().await?,
            total_roles: self.accounts.role_count().await?,
            total_customers: self.accounts.customer_count().await?,
            total_orders: orders.len() as u64,
            total_revenue,
        })
    }

    /// Revenue and order count over `[start, end]`; both bounds inclusive
    /// and either may be open.
    #[tracing::instrument(skip(self))]
    pub async fn revenue_in_range(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<RevenueReport> {
        let orders = self.store.created_in_range(start, end).await?;
        metrics::counter!("analytics_reports_total", "report" => "revenue").increment(1);
        Ok(RevenueReport {
            total_revenue: orders.iter().map(|order| order.total_amount).sum(),
            total_orders: orders.len() as u64,
        })
    }

    /// Monthly revenue buckets for the window that starts at the first of
    /// the month `months - 1` months back. `months` is clamped to
    /// `[1, 24]`. Buckets are ascending by `(year, month)` and sparse:
    /// empty months are omitted.
    #[tracing::instrument(skip(self))]
    pub async fn monthly_trend(&self, months: u32) -> Result<Vec<MonthlyRevenue>> {
        let months = months.clamp(1, MAX_TREND_MONTHS);
        let boundary = month_floor(Utc::now(), months - 1);
        let orders = self.store.created_in_range(boundary, None).await?;

        let mut buckets: BTreeMap<(i32, u32), (u64, Money)> = BTreeMap::new();
        for order in &orders {
            let key = (order.created_at.year(), order.created_at.month());
            let bucket = buckets.entry(key).or_insert((0, Money::zero()));
            bucket.0 += 1;
            bucket.1 += order.total_amount;
        }

        metrics::counter!("analytics_reports_total", "report" => "monthly_trend").increment(1);
        Ok(buckets
            .into_iter()
            .map(|((year, month), (total_orders, total_revenue))| MonthlyRevenue {
                year,
                month,
                total_orders,
                total_revenue,
            })
            .collect())
    }

    /// Ranks customers by order count (ties broken by revenue), grouping by
    /// the raw stored identity value so guest buckets rank alongside
    /// registered accounts. Only buckets whose value has the canonical
    /// account shape are decorated with a name and email; a failed profile
    /// lookup keeps the bucket and drops the decoration.
    #[tracing::instrument(skip(self))]
    pub async fn top_customers(&self, limit: Option<u64>) -> Result<Vec<TopCustomer>> {
        let limit = limit.unwrap_or(DEFAULT_TOP_CUSTOMERS).clamp(1, MAX_TOP_CUSTOMERS);
        let orders = self.store.created_in_range(None, None).await?;

        let mut buckets: HashMap<String, (u64, Money)> = HashMap::new();
        for order in &orders {
            let bucket = buckets
                .entry(order.customer.storage_key().to_string())
                .or_insert((0, Money::zero()));
            bucket.0 += 1;
            bucket.1 += order.total_amount;
        }

        let mut ranking = Vec::with_capacity(buckets.len());
        for (customer_id, (order_count, total_revenue)) in buckets {
            let (name, email) = self.decorate(&customer_id).await;
            ranking.push(TopCustomer {
                customer_id,
                name,
                email,
                order_count,
                total_revenue,
            });
        }

        ranking.sort_by(|a, b| {
            b.order_count
                .cmp(&a.order_count)
                .then(b.total_revenue.cmp(&a.total_revenue))
        });
        ranking.truncate(limit as usize);

        metrics::counter!("analytics_reports_total", "report" => "top_customers").increment(1);
        Ok(ranking)
    }

    /// Products at or below the stock threshold (default 5), lowest first.
    #[tracing::instrument(skip(self))]
    pub async fn low_stock(&self, threshold: Option<u32>) -> Result<Vec<ProductSummary>> {
        let threshold = threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
        Ok(self
            .catalog
            .low_stock(threshold, DEFAULT_LOW_STOCK_LIMIT)
            .await?)
    }

    /// Best-selling products (default 5), most units first.
    #[tracing::instrument(skip(self))]
    pub async fn top_selling(&self, limit: Option<u64>) -> Result<Vec<ProductSales>> {
        let limit = limit.unwrap_or(DEFAULT_TOP_SELLING);
        Ok(self.catalog.top_selling(limit).await?)
    }

    /// Resolves decoration for one raw identity value, shape-checked first.
    async fn decorate(&self, raw: &str) -> (Option<String>, Option<String>) {
        let Some(account_id) = CustomerRef::from_stored(raw).account_id().cloned() else {
            return (None, None);
        };
        match self.accounts.get_profile(&account_id).await {
            Ok(Some(profile)) => (
                Some(profile.display_name().to_string()),
                Some(profile.email),
            ),
            Ok(None) => (None, None),
            Err(err) => {
                tracing::warn!(customer = raw, error = %err, "ranking decoration failed");
                (None, None)
            }
        }
    }
}

/// Midnight UTC on the first of the month `months_back` months before `now`.
fn month_floor(now: DateTime<Utc>, months_back: u32) -> Option<DateTime<Utc>> {
    let total = now.year() * 12 + now.month() as i32 - 1 - months_back as i32;
    let year = total.div_euclid(12);
    let month = (total.rem_euclid(12) + 1) as u32;
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}
