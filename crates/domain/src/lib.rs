//! Domain layer for the pizza order service.
//!
//! This crate provides the core order-placement types:
//! - Order, the persisted record of a checkout, and its payment sub-state
//! - Cart and cart items read from the customer's session
//! - PlaceOrder command with request validation
//! - OrderEvent published to downstream listeners

pub mod customer;
pub mod order;

pub use common::{CustomerId, OrderId};
pub use customer::Customer;
pub use order::{
    Cart, CartItem, Money, NewOrder, Order, OrderError, OrderEvent, OrderStatus, PaymentState,
    PaymentType, PlaceOrder, PlacedOrder, ProductId,
};
