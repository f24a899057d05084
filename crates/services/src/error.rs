//! Collaborator service error types.

use thiserror::Error;

/// Errors from collaborator services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Account service error.
    #[error("Account service error: {0}")]
    Accounts(String),

    /// Stock service error.
    #[error("Stock service error: {0}")]
    Stock(String),

    /// Requested quantity exceeds the tracked stock level.
    #[error("Insufficient stock for product {product_id}: requested {requested}, have {available}")]
    InsufficientStock {
        product_id: String,
        requested: u32,
        available: u32,
    },

    /// Catalog service error.
    #[error("Catalog service error: {0}")]
    Catalog(String),

    /// Notification service error.
    #[error("Notification service error: {0}")]
    Notification(String),
}

/// Convenience type alias for service results.
pub type Result<T> = std::result::Result<T, ServiceError>;
