//! Administrative analytics endpoints.

use std::sync::Arc;

use analytics::{MonthlyRevenue, RevenueReport, SummaryReport, TopCustomer};
use axum::Json;
use axum::extract::{Query, State};
use chrono::{DateTime, Utc};
use ledger::OrderStore;
use serde::Deserialize;
use services::{ProductSales, ProductSummary};

use crate::error::ApiError;
use crate::routes::orders::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MonthsQuery {
    pub months: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ThresholdQuery {
    pub threshold: Option<u32>,
}

/// GET /admin/stats/summary
#[tracing::instrument(skip(state))]
pub async fn summary<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<SummaryReport>, ApiError> {
    Ok(Json(state.analytics.summary().await?))
}

/// GET /admin/stats/revenue?start=..&end=..
#[tracing::instrument(skip(state))]
pub async fn revenue<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<RevenueReport>, ApiError> {
    Ok(Json(
        state
            .analytics
            .revenue_in_range(query.start, query.end)
            .await?,
    ))
}

/// GET /admin/stats/monthly?months=..
#[tracing::instrument(skip(state))]
pub async fn monthly<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<MonthsQuery>,
) -> Result<Json<Vec<MonthlyRevenue>>, ApiError> {
    Ok(Json(
        state
            .analytics
            .monthly_trend(query.months.unwrap_or(12))
            .await?,
    ))
}

/// GET /admin/stats/top-customers?limit=..
#[tracing::instrument(skip(state))]
pub async fn top_customers<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<TopCustomer>>, ApiError> {
    Ok(Json(state.analytics.top_customers(query.limit).await?))
}

/// GET /admin/stats/low-stock?threshold=..
#[tracing::instrument(skip(state))]
pub async fn low_stock<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<ThresholdQuery>,
) -> Result<Json<Vec<ProductSummary>>, ApiError> {
    Ok(Json(state.analytics.low_stock(query.threshold).await?))
}

/// GET /admin/stats/top-selling?limit=..
#[tracing::instrument(skip(state))]
pub async fn top_selling<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<ProductSales>>, ApiError> {
    Ok(Json(state.analytics.top_selling(query.limit).await?))
}
