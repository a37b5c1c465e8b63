use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use domain::{Customer, NewOrder, Order, PlacedOrder};
use tokio::sync::RwLock;

use crate::{
    CustomerId, OrderId, OrderStoreError, Result,
    store::{OrderStore, SortDirection},
};

/// Operations that can be made to fail on demand.
#[derive(Debug, Clone, Copy, Default)]
struct FailureFlags {
    create: bool,
    populate: bool,
    save: bool,
    find: bool,
}

#[derive(Default)]
struct MemoryState {
    /// Orders in insertion order.
    orders: Vec<Order>,
    customers: HashMap<CustomerId, Customer>,
    fail: FailureFlags,
}

/// In-memory order store implementation for testing and local runs.
///
/// Provides the same interface as the PostgreSQL implementation, plus
/// switches that make individual operations fail.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Returns every stored order in insertion order.
    pub async fn all_orders(&self) -> Vec<Order> {
        self.state.read().await.orders.clone()
    }

    /// Makes `create` fail until reset.
    pub async fn set_fail_on_create(&self, fail: bool) {
        self.state.write().await.fail.create = fail;
    }

    /// Makes `populate_customer` fail until reset.
    pub async fn set_fail_on_populate(&self, fail: bool) {
        self.state.write().await.fail.populate = fail;
    }

    /// Makes `save` fail until reset.
    pub async fn set_fail_on_save(&self, fail: bool) {
        self.state.write().await.fail.save = fail;
    }

    /// Makes `find_by_customer` and `find_by_id` fail until reset.
    pub async fn set_fail_on_find(&self, fail: bool) {
        self.state.write().await.fail.find = fail;
    }

    /// Clears all orders, customers and failure switches.
    pub async fn clear(&self) {
        *self.state.write().await = MemoryState::default();
    }
}

fn unavailable(op: &str) -> OrderStoreError {
    OrderStoreError::Unavailable(format!("{op} failed"))
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, new_order: NewOrder) -> Result<Order> {
        let mut state = self.state.write().await;
        if state.fail.create {
            return Err(unavailable("create"));
        }

        let order = Order::create(new_order, Utc::now());
        state.orders.push(order.clone());
        Ok(order)
    }

    async fn populate_customer(&self, order: Order) -> Result<PlacedOrder> {
        let state = self.state.read().await;
        if state.fail.populate {
            return Err(unavailable("populate"));
        }

        let customer = state.customers.get(&order.customer_id).cloned();
        Ok(PlacedOrder::new(order, customer))
    }

    async fn save(&self, mut order: Order) -> Result<Order> {
        let mut state = self.state.write().await;
        if state.fail.save {
            return Err(unavailable("save"));
        }

        let slot = state
            .orders
            .iter_mut()
            .find(|o| o.id == order.id)
            .ok_or(OrderStoreError::OrderNotFound(order.id))?;
        order.updated_at = Utc::now();
        *slot = order.clone();
        Ok(order)
    }

    async fn find_by_customer(
        &self,
        customer_id: CustomerId,
        sort: SortDirection,
    ) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        if state.fail.find {
            return Err(unavailable("find"));
        }

        let mut orders: Vec<_> = match sort {
            // Reverse first so equal timestamps keep newest-inserted first.
            SortDirection::Descending => state
                .orders
                .iter()
                .rev()
                .filter(|o| o.customer_id == customer_id)
                .cloned()
                .collect(),
            SortDirection::Ascending => state
                .orders
                .iter()
                .filter(|o| o.customer_id == customer_id)
                .cloned()
                .collect(),
        };
        match sort {
            SortDirection::Descending => orders.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortDirection::Ascending => orders.sort_by_key(|o| o.created_at),
        }
        Ok(orders)
    }

    async fn find_by_id(&self, order_id: OrderId) -> Result<Option<Order>> {
        let state = self.state.read().await;
        if state.fail.find {
            return Err(unavailable("find"));
        }

        Ok(state.orders.iter().find(|o| o.id == order_id).cloned())
    }

    async fn upsert_customer(&self, customer: Customer) -> Result<()> {
        self.state
            .write()
            .await
            .customers
            .insert(customer.id, customer);
        Ok(())
    }
}
