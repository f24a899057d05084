//! Domain error types.

use common::OrderId;
use ledger::{OrderStatus, StoreError};
use services::ServiceError;
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The request payload failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Order not found.
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// The requested lifecycle change is not allowed from the current state.
    #[error("Cannot {action} an order in state '{from}'")]
    InvalidTransition { from: OrderStatus, action: String },

    /// Storage error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A collaborator service failed.
    #[error("Collaborator error: {0}")]
    Collaborator(#[from] ServiceError),
}

impl DomainError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }
}

/// Convenience type alias for domain results.
pub type Result<T> = std::result::Result<T, DomainError>;
