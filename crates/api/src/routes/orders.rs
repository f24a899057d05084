//! Checkout and customer-facing order endpoints.

use analytics::AggregationEngine;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use common::OrderId;
use domain::{CheckoutOutcome, CheckoutPayload, OrderLedger};
use ledger::{Order, OrderStore};
use std::sync::Arc;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: OrderStore> {
    pub ledger: OrderLedger<S>,
    pub analytics: AggregationEngine<S>,
}

/// Header carrying the caller's raw identity value, when present.
pub const USER_ID_HEADER: &str = "x-user-id";

pub(crate) fn actor_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers.get(USER_ID_HEADER).and_then(|v| v.to_str().ok())
}

pub(crate) fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid order id: {e}")))?;
    Ok(OrderId::from_uuid(uuid))
}

/// POST /checkout — place an order as the calling customer.
///
/// The `x-user-id` header carries the caller's identity value when present;
/// without it the order is placed under a freshly minted guest token.
#[tracing::instrument(skip(state, headers, payload))]
pub async fn checkout<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Json(payload): Json<CheckoutPayload>,
) -> Result<(StatusCode, Json<CheckoutOutcome>), ApiError> {
    let outcome = state
        .ledger
        .checkout(actor_from_headers(&headers), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// POST /checkout/guest — place an order without an account.
#[tracing::instrument(skip(state, payload))]
pub async fn guest_checkout<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(payload): Json<CheckoutPayload>,
) -> Result<(StatusCode, Json<CheckoutOutcome>), ApiError> {
    let outcome = state.ledger.guest_checkout(payload).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// GET /orders — the calling customer's orders, newest first.
#[tracing::instrument(skip(state, headers))]
pub async fn my_orders<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Order>>, ApiError> {
    let actor = actor_from_headers(&headers)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("missing {USER_ID_HEADER} header")))?;

    let orders = state.ledger.orders_for_customer(actor).await?;
    Ok(Json(orders))
}

/// POST /orders/:id/cancel — cancel a pending order.
#[tracing::instrument(skip(state))]
pub async fn cancel<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.ledger.cancel(order_id).await?;
    Ok(Json(order))
}
