//! The persisted order record.

use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId};
use serde::{Deserialize, Serialize};

use super::{CartItem, Money, OrderError, OrderStatus, PaymentState, PaymentType};
use crate::Customer;

/// Fields supplied when an order is first persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub items: Vec<CartItem>,
    pub phone: String,
    pub address: String,
}

/// A customer's checkout as stored by the order store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub items: Vec<CartItem>,
    pub phone: String,
    pub address: String,
    /// True only once the payment gateway has confirmed a charge.
    pub payment_status: bool,
    /// Unset until a card charge succeeds.
    pub payment_type: Option<PaymentType>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Builds an unpaid order from `new`, stamped with `now`.
    pub fn create(new: NewOrder, now: DateTime<Utc>) -> Self {
        Self {
            id: OrderId::new(),
            customer_id: new.customer_id,
            items: new.items,
            phone: new.phone,
            address: new.address,
            payment_status: false,
            payment_type: None,
            status: OrderStatus::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn payment_state(&self) -> PaymentState {
        if self.payment_status {
            PaymentState::Paid
        } else {
            PaymentState::Unpaid
        }
    }

    /// Records a confirmed charge.
    ///
    /// Fails if the order is already paid.
    pub fn mark_paid(&mut self, payment_type: PaymentType) -> Result<(), OrderError> {
        if self.payment_status {
            return Err(OrderError::AlreadyPaid(self.id));
        }
        self.payment_status = true;
        self.payment_type = Some(payment_type);
        Ok(())
    }

    /// Sum of line totals.
    pub fn items_total(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Returns true if `customer` owns this order.
    ///
    /// Identities are compared in their string form.
    pub fn is_owned_by(&self, customer: &CustomerId) -> bool {
        self.customer_id.to_string() == customer.to_string()
    }
}

/// An order with its customer reference resolved.
///
/// `customer` is `None` when the referenced account has no stored record;
/// it serializes as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedOrder {
    #[serde(flatten)]
    pub order: Order,
    pub customer: Option<Customer>,
}

impl PlacedOrder {
    pub fn new(order: Order, customer: Option<Customer>) -> Self {
        Self { order, customer }
    }

    pub fn id(&self) -> OrderId {
        self.order.id
    }
}
