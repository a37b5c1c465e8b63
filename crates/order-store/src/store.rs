use std::sync::Arc;

use async_trait::async_trait;
use domain::{Customer, NewOrder, Order, PlacedOrder};

use crate::{CustomerId, OrderId, Result};

/// Ordering applied to `created_at` when listing orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    /// Newest first.
    #[default]
    Descending,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// Core trait for order store implementations.
///
/// An order store persists orders and resolves their customer reference.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new unpaid order and returns it with its id and timestamps.
    async fn create(&self, new_order: NewOrder) -> Result<Order>;

    /// Resolves the order's customer reference.
    ///
    /// A customer with no stored record resolves to `None`.
    async fn populate_customer(&self, order: Order) -> Result<PlacedOrder>;

    /// Overwrites the stored order with `order` and returns the stored copy.
    ///
    /// Fails with `OrderNotFound` if no order has this id.
    async fn save(&self, order: Order) -> Result<Order>;

    /// Lists a customer's orders sorted by creation time.
    async fn find_by_customer(
        &self,
        customer_id: CustomerId,
        sort: SortDirection,
    ) -> Result<Vec<Order>>;

    /// Loads a single order.
    ///
    /// Returns None if the order doesn't exist.
    async fn find_by_id(&self, order_id: OrderId) -> Result<Option<Order>>;

    /// Inserts or replaces a customer record.
    async fn upsert_customer(&self, customer: Customer) -> Result<()>;
}

#[async_trait]
impl<T: OrderStore + ?Sized> OrderStore for Arc<T> {
    async fn create(&self, new_order: NewOrder) -> Result<Order> {
        (**self).create(new_order).await
    }

    async fn populate_customer(&self, order: Order) -> Result<PlacedOrder> {
        (**self).populate_customer(order).await
    }

    async fn save(&self, order: Order) -> Result<Order> {
        (**self).save(order).await
    }

    async fn find_by_customer(
        &self,
        customer_id: CustomerId,
        sort: SortDirection,
    ) -> Result<Vec<Order>> {
        (**self).find_by_customer(customer_id, sort).await
    }

    async fn find_by_id(&self, order_id: OrderId) -> Result<Option<Order>> {
        (**self).find_by_id(order_id).await
    }

    async fn upsert_customer(&self, customer: Customer) -> Result<()> {
        (**self).upsert_customer(customer).await
    }
}
