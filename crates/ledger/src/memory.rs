use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
    Order, OrderFilter, OrderId, OrderPatch, OrderStore, PageRequest, PageResult, Result,
    SortField, SortOrder,
};

/// In-memory order store.
///
/// Backs tests and standalone deployments with the same interface as the
/// PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Clears all orders.
    pub async fn clear(&self) {
        self.orders.write().await.clear();
    }
}

fn sort_orders(orders: &mut [Order], sort_by: SortField, sort_order: SortOrder) {
    orders.sort_by(|a, b| {
        let ordering = match sort_by {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::TotalAmount => a.total_amount.cmp(&b.total_amount),
        };
        match sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<()> {
        self.orders.write().await.insert(order.id, order);
        Ok(())
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn update(&self, id: OrderId, patch: OrderPatch) -> Result<Option<Order>> {
        let mut orders = self.orders.write().await;
        Ok(orders.get_mut(&id).map(|order| {
            patch.apply(order);
            order.clone()
        }))
    }

    async fn delete(&self, id: OrderId) -> Result<bool> {
        Ok(self.orders.write().await.remove(&id).is_some())
    }

    async fn find_by_customer(&self, customer_key: &str) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut found: Vec<Order> = orders
            .values()
            .filter(|order| order.customer.storage_key() == customer_key)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn list(&self, filter: OrderFilter, page: PageRequest) -> Result<PageResult<Order>> {
        let orders = self.orders.read().await;
        let mut matching: Vec<Order> = orders
            .values()
            .filter(|order| filter.status.is_none_or(|status| order.status == status))
            .cloned()
            .collect();

        let total = matching.len() as u64;
        sort_orders(&mut matching, page.sort_by, page.sort_order);

        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect();

        Ok(PageResult {
            items,
            page: page.page,
            limit: page.limit,
            total,
        })
    }

    async fn created_in_range(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut matching: Vec<Order> = orders
            .values()
            .filter(|order| {
                start.is_none_or(|from| order.created_at >= from)
                    && end.is_none_or(|to| order.created_at <= to)
            })
            .cloned()
            .collect();
        matching.sort_by_key(|order| order.created_at);
        Ok(matching)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.orders.read().await.len() as u64)
    }
}
