use thiserror::Error;

use crate::OrderId;

/// Errors that can occur when interacting with the order store.
#[derive(Debug, Error)]
pub enum OrderStoreError {
    /// No order exists with this id.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored column holds a value the domain does not recognise.
    #[error("Invalid stored value: {0}")]
    InvalidData(#[from] domain::OrderError),

    /// The backing store could not serve the request.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for order store operations.
pub type Result<T> = std::result::Result<T, OrderStoreError>;
