//! Administrative order management endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::Money;
use domain::{OrderDetail, OrderView};
use ledger::{
    OrderFilter, OrderPatch, OrderStatus, OrderStore, PageRequest, PaymentMethod, SortField,
    SortOrder,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::routes::orders::{AppState, parse_order_id};

/// Upper bounds on client-supplied pagination.
const MAX_PAGE: u64 = 100_000;
const MAX_LIMIT: u64 = 200;

/// Query parameters for the order listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub status: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ListQuery {
    fn filter(&self) -> Result<OrderFilter, ApiError> {
        let status = match self.status.as_deref() {
            Some(raw) => Some(
                raw.parse::<OrderStatus>()
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?,
            ),
            None => None,
        };
        Ok(OrderFilter { status })
    }

    fn page_request(&self) -> Result<PageRequest, ApiError> {
        let sort_by = match self.sort_by.as_deref() {
            None | Some("createdAt") => SortField::CreatedAt,
            Some("updatedAt") => SortField::UpdatedAt,
            Some("totalAmount") => SortField::TotalAmount,
            Some(other) => {
                return Err(ApiError::BadRequest(format!("unknown sort field: {other}")));
            }
        };
        let sort_order = match self.sort_order.as_deref() {
            None | Some("desc") => SortOrder::Desc,
            Some("asc") => SortOrder::Asc,
            Some(other) => {
                return Err(ApiError::BadRequest(format!("unknown sort order: {other}")));
            }
        };

        let default = PageRequest::default();
        let page = self.page.unwrap_or(default.page).max(1);
        if page > MAX_PAGE {
            return Err(ApiError::BadRequest(format!(
                "page must be at most {MAX_PAGE}"
            )));
        }
        let limit = self.limit.unwrap_or(default.limit).max(1);
        if limit > MAX_LIMIT {
            return Err(ApiError::BadRequest(format!(
                "limit must be at most {MAX_LIMIT}"
            )));
        }

        Ok(PageRequest {
            page,
            limit,
            sort_by,
            sort_order,
        })
    }
}

/// One page of decorated orders.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub items: Vec<OrderView>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

/// Partial order update, all fields optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub status: Option<OrderStatus>,
    pub payment_method: Option<PaymentMethod>,
    pub address: Option<String>,
    pub shipping_fee: Option<i64>,
    pub note: Option<String>,
    pub total_amount: Option<i64>,
}

impl UpdateOrderRequest {
    fn into_patch(self) -> Result<OrderPatch, ApiError> {
        if self.shipping_fee.is_some_and(|fee| fee < 0) {
            return Err(ApiError::BadRequest(
                "shipping fee must not be negative".to_string(),
            ));
        }
        if self.total_amount.is_some_and(|total| total <= 0) {
            return Err(ApiError::BadRequest(
                "order total must be positive".to_string(),
            ));
        }

        Ok(OrderPatch {
            status: self.status,
            payment_method: self.payment_method,
            shipping_address: self.address,
            shipping_fee: self.shipping_fee.map(Money::new),
            note: self.note,
            total_amount: self.total_amount.map(Money::new),
        })
    }
}

/// GET /admin/orders — paginated, filtered, sorted listing.
#[tracing::instrument(skip(state))]
pub async fn list<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, ApiError> {
    let filter = query.filter()?;
    let page = query.page_request()?;
    let result = state.ledger.list(filter, page).await?;

    let total_pages = result.total_pages();
    Ok(Json(ListResponse {
        items: result.items,
        page: result.page,
        limit: result.limit,
        total: result.total,
        total_pages,
    }))
}

/// GET /admin/orders/:id — full detail with customer join and order code.
#[tracing::instrument(skip(state))]
pub async fn detail<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderDetail>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let detail = state.ledger.detail(order_id).await?;
    Ok(Json(detail))
}

/// PATCH /admin/orders/:id — apply a partial update.
#[tracing::instrument(skip(state, req))]
pub async fn update<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateOrderRequest>,
) -> Result<Json<OrderView>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let patch = req.into_patch()?;
    let view = state.ledger.update(order_id, patch).await?;
    Ok(Json(view))
}

/// DELETE /admin/orders/:id — remove an order; succeeds even when the
/// target no longer exists.
#[tracing::instrument(skip(state))]
pub async fn delete<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let order_id = parse_order_id(&id)?;
    state.ledger.delete(order_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
