//! Order placement for the pizza shop.
//!
//! The workflow runs one checkout as a single sequential chain:
//! 1. Validate the checkout form
//! 2. Persist the order and resolve its customer
//! 3. For card payments, charge the cart total and record the payment
//! 4. Notify listeners once a card payment is recorded
//!
//! It also serves the customer's order history and single-order views.

pub mod error;
pub mod services;
pub mod workflow;

pub use error::{CheckoutError, PaymentError};
pub use services::{
    BroadcastNotifier, ChargeRequest, ChargeResult, InMemoryPaymentGateway, Notifier,
    PaymentGateway, StripeConfig, StripePaymentGateway,
};
pub use workflow::{OrderPlacementWorkflow, PlacementOutcome, ShowOutcome, DEFAULT_CURRENCY};
