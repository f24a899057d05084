//! Stock service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::{Result, ServiceError};

/// Trait for stock level adjustments around checkout.
///
/// Products the service does not track are accepted silently: a decrease or
/// restore against an unknown product is a no-op success, so the ledger never
/// blocks checkout on catalog gaps.
#[async_trait]
pub trait StockService: Send + Sync {
    /// Decreases the stock level of a product by `quantity`.
    async fn decrease(&self, product_id: &str, quantity: u32) -> Result<()>;

    /// Restores previously decreased stock. Used to unwind a checkout whose
    /// later steps failed.
    async fn restore(&self, product_id: &str, quantity: u32) -> Result<()>;
}

#[derive(Debug, Default)]
struct InMemoryStockState {
    levels: HashMap<String, u32>,
    fail_on_decrease: Option<String>,
}

/// In-memory stock service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStockService {
    state: Arc<RwLock<InMemoryStockState>>,
}

impl InMemoryStockService {
    /// Creates a new in-memory stock service with no tracked products.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tracked level for a product.
    pub fn set_stock(&self, product_id: &str, quantity: u32) {
        self.state
            .write()
            .unwrap()
            .levels
            .insert(product_id.to_string(), quantity);
    }

    /// Returns the tracked level for a product, if any.
    pub fn stock_of(&self, product_id: &str) -> Option<u32> {
        self.state.read().unwrap().levels.get(product_id).copied()
    }

    /// Configures the service to fail on decrease calls for one product.
    pub fn set_fail_on_decrease(&self, product_id: Option<&str>) {
        self.state.write().unwrap().fail_on_decrease = product_id.map(str::to_string);
    }
}

#[async_trait]
impl StockService for InMemoryStockService {
    async fn decrease(&self, product_id: &str, quantity: u32) -> Result<()> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_decrease.as_deref() == Some(product_id) {
            return Err(ServiceError::Stock("Stock adjustment failed".to_string()));
        }

        match state.levels.get_mut(product_id) {
            Some(level) if *level >= quantity => {
                *level -= quantity;
                Ok(())
            }
            Some(level) => Err(ServiceError::InsufficientStock {
                product_id: product_id.to_string(),
                requested: quantity,
                available: *level,
            }),
            // Untracked product: accept without adjustment.
            None => Ok(()),
        }
    }

    async fn restore(&self, product_id: &str, quantity: u32) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if let Some(level) = state.levels.get_mut(product_id) {
            *level += quantity;
        }
        Ok(())
    }
}
