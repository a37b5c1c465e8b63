//! Order, cart and payment types.

mod commands;
mod entity;
mod events;
mod state;
mod value_objects;

pub use commands::PlaceOrder;
pub use entity::{NewOrder, Order, PlacedOrder};
pub use events::OrderEvent;
pub use state::{OrderStatus, PaymentState, PaymentType};
pub use value_objects::{Cart, CartItem, Money, ProductId};

use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    /// Phone or address missing from the checkout form.
    #[error("All fields are required")]
    MissingFields,

    /// Payment sub-state does not allow the requested transition.
    #[error("Invalid payment transition: cannot move from {from} to {to}")]
    InvalidPaymentTransition { from: PaymentState, to: PaymentState },

    /// Order has already been marked as paid.
    #[error("Order {0} is already paid")]
    AlreadyPaid(common::OrderId),

    /// Unrecognised payment type string.
    #[error("Unknown payment type: {0}")]
    UnknownPaymentType(String),

    /// Unrecognised order status string.
    #[error("Unknown order status: {0}")]
    UnknownStatus(String),
}
