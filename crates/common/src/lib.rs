//! Shared types for the pizza order service.

pub mod types;

pub use types::{CustomerId, OrderId};
