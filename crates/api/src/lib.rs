//! HTTP API server with observability for the order ledger.
//!
//! Provides REST endpoints for checkout, order management, and the admin
//! analytics dashboards, with structured logging (tracing) and Prometheus
//! metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, patch, post};
use ledger::OrderStore;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: OrderStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/checkout", post(routes::orders::checkout::<S>))
        .route("/checkout/guest", post(routes::orders::guest_checkout::<S>))
        .route("/orders", get(routes::orders::my_orders::<S>))
        .route("/orders/{id}/cancel", post(routes::orders::cancel::<S>))
        .route("/admin/orders", get(routes::admin::list::<S>))
        .route("/admin/orders/{id}", get(routes::admin::detail::<S>))
        .route("/admin/orders/{id}", patch(routes::admin::update::<S>))
        .route("/admin/orders/{id}", delete(routes::admin::delete::<S>))
        .route("/admin/stats/summary", get(routes::stats::summary::<S>))
        .route("/admin/stats/revenue", get(routes::stats::revenue::<S>))
        .route("/admin/stats/monthly", get(routes::stats::monthly::<S>))
        .route(
            "/admin/stats/top-customers",
            get(routes::stats::top_customers::<S>),
        )
        .route("/admin/stats/low-stock", get(routes::stats::low_stock::<S>))
        .route(
            "/admin/stats/top-selling",
            get(routes::stats::top_selling::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Handles onto the in-memory collaborator services, for seeding and tests.
#[derive(Clone)]
pub struct Collaborators {
    pub accounts: Arc<services::InMemoryAccountStore>,
    pub stock: Arc<services::InMemoryStockService>,
    pub catalog: Arc<services::InMemoryCatalogService>,
    pub notifier: Arc<services::InMemoryNotificationSender>,
}

/// Creates the default application state over a store, with in-memory
/// collaborator services.
pub fn create_default_state<S: OrderStore + Clone + 'static>(
    store: S,
) -> (Arc<AppState<S>>, Collaborators) {
    use analytics::AggregationEngine;
    use domain::OrderLedger;
    use services::{
        AccountStore, CatalogService, InMemoryAccountStore, InMemoryCatalogService,
        InMemoryNotificationSender, InMemoryStockService, NotificationSender, StockService,
    };

    let accounts = Arc::new(InMemoryAccountStore::new());
    let stock = Arc::new(InMemoryStockService::new());
    let catalog = Arc::new(InMemoryCatalogService::new());
    let notifier = Arc::new(InMemoryNotificationSender::new());

    let ledger = OrderLedger::new(
        store.clone(),
        Arc::clone(&stock) as Arc<dyn StockService>,
        Arc::clone(&accounts) as Arc<dyn AccountStore>,
        Arc::clone(&notifier) as Arc<dyn NotificationSender>,
    );
    let analytics = AggregationEngine::new(
        store,
        Arc::clone(&accounts) as Arc<dyn AccountStore>,
        Arc::clone(&catalog) as Arc<dyn CatalogService>,
    );

    let state = Arc::new(AppState { ledger, analytics });
    let collaborators = Collaborators {
        accounts,
        stock,
        catalog,
        notifier,
    };

    (state, collaborators)
}
