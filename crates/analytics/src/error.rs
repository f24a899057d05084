//! Analytics error types.

use ledger::StoreError;
use services::ServiceError;
use thiserror::Error;

/// Errors that can occur while computing reports.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Storage error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A collaborator service failed.
    #[error("Collaborator error: {0}")]
    Collaborator(#[from] ServiceError),
}

/// Convenience type alias for analytics results.
pub type Result<T> = std::result::Result<T, AnalyticsError>;
