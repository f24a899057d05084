//! The `OrderStore` trait: the persistence seam for the order ledger.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{Order, OrderId, OrderPatch, OrderStatus};

/// Errors from the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Failed to (de)serialize a stored document field.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored column holds a value outside the known vocabulary.
    #[error("corrupt {column} column: {value:?}")]
    Corrupt { column: &'static str, value: String },
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Filter for administrative order listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
}

/// Sortable columns for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    TotalAmount,
}

impl SortField {
    /// SQL column name. Kept as a closed set so listing sorts never
    /// interpolate caller input.
    pub fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::TotalAmount => "total_amount",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Pagination and sorting for listings.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u64,
    pub limit: u64,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 50,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl PageRequest {
    /// Rows to skip for this page. Saturates rather than overflowing on
    /// absurd page numbers.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// One page of results plus the unpaginated total.
#[derive(Debug, Clone)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
}

impl<T> PageResult<T> {
    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            0
        } else {
            self.total.div_ceil(self.limit)
        }
    }
}

/// Storage backend for the order ledger.
///
/// Writes are single-document inserts or single-document field updates,
/// atomic at the document level only; callers own any check-then-act
/// sequencing above this trait. Reads are point-in-time snapshots.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new order.
    async fn insert(&self, order: Order) -> Result<()>;

    /// Loads an order by ID.
    async fn get(&self, id: OrderId) -> Result<Option<Order>>;

    /// Applies a partial update and returns the updated order, or `None`
    /// when the order does not exist.
    async fn update(&self, id: OrderId, patch: OrderPatch) -> Result<Option<Order>>;

    /// Removes an order. Returns whether a document was actually removed.
    async fn delete(&self, id: OrderId) -> Result<bool>;

    /// All orders whose stored identity value equals `customer_key`,
    /// newest first.
    async fn find_by_customer(&self, customer_key: &str) -> Result<Vec<Order>>;

    /// Paginated, filtered, sorted listing.
    async fn list(&self, filter: OrderFilter, page: PageRequest) -> Result<PageResult<Order>>;

    /// All orders with `created_at` inside the inclusive range; either bound
    /// may be open.
    async fn created_in_range(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<Order>>;

    /// Total number of orders in the ledger.
    async fn count(&self) -> Result<u64>;
}
