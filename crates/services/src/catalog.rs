//! Catalog service trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServiceError};

/// A product with its current stock level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub product_id: String,
    pub name: String,
    pub stock: u32,
}

/// A product with its lifetime sales count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
    pub product_id: String,
    pub name: String,
    pub units_sold: u64,
}

/// Trait for catalog queries backing the admin dashboards.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Products at or below `threshold` units, lowest stock first.
    async fn low_stock(&self, threshold: u32, limit: u64) -> Result<Vec<ProductSummary>>;

    /// Best-selling products, most units first.
    async fn top_selling(&self, limit: u64) -> Result<Vec<ProductSales>>;

    /// Total number of products in the catalog.
    async fn product_count(&self) -> Result<u64>;

    /// Total number of categories in the catalog.
    async fn category_count(&self) -> Result<u64>;
}

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    products: Vec<(ProductSummary, u64)>,
    categories: Vec<String>,
    fail_on_query: bool,
}

/// In-memory catalog service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogService {
    state: Arc<RwLock<InMemoryCatalogState>>,
}

impl InMemoryCatalogService {
    /// Creates a new in-memory catalog service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a product with its stock level and sales count.
    pub fn insert(&self, product_id: &str, name: &str, stock: u32, units_sold: u64) {
        self.state.write().unwrap().products.push((
            ProductSummary {
                product_id: product_id.to_string(),
                name: name.to_string(),
                stock,
            },
            units_sold,
        ));
    }

    /// Registers a category.
    pub fn insert_category(&self, name: &str) {
        self.state.write().unwrap().categories.push(name.to_string());
    }

    /// Configures the service to fail on the next query.
    pub fn set_fail_on_query(&self, fail: bool) {
        self.state.write().unwrap().fail_on_query = fail;
    }
}

#[async_trait]
impl CatalogService for InMemoryCatalogService {
    async fn low_stock(&self, threshold: u32, limit: u64) -> Result<Vec<ProductSummary>> {
        let state = self.state.read().unwrap();
        if state.fail_on_query {
            return Err(ServiceError::Catalog("Catalog query failed".to_string()));
        }

        let mut matching: Vec<ProductSummary> = state
            .products
            .iter()
            .map(|(summary, _)| summary.clone())
            .filter(|summary| summary.stock <= threshold)
            .collect();
        matching.sort_by_key(|summary| summary.stock);
        matching.truncate(limit as usize);
        Ok(matching)
    }

    async fn top_selling(&self, limit: u64) -> Result<Vec<ProductSales>> {
        let state = self.state.read().unwrap();
        if state.fail_on_query {
            return Err(ServiceError::Catalog("Catalog query failed".to_string()));
        }

        let mut sales: Vec<ProductSales> = state
            .products
            .iter()
            .map(|(summary, units_sold)| ProductSales {
                product_id: summary.product_id.clone(),
                name: summary.name.clone(),
                units_sold: *units_sold,
            })
            .collect();
        sales.sort_by(|a, b| b.units_sold.cmp(&a.units_sold));
        sales.truncate(limit as usize);
        Ok(sales)
    }

    async fn product_count(&self) -> Result<u64> {
        Ok(self.state.read().unwrap().products.len() as u64)
    }

    async fn category_count(&self) -> Result<u64> {
        Ok(self.state.read().unwrap().categories.len() as u64)
    }
}
