//! Checkout error types.

use common::OrderId;
use domain::OrderError;
use order_store::OrderStoreError;
use thiserror::Error;

/// Errors raised by a payment gateway.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The processor refused the charge.
    #[error("Charge declined: {0}")]
    Declined(String),

    /// The processor could not be reached or answered garbage.
    #[error("Payment transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The gateway is misconfigured (bad key, bad URL).
    #[error("Payment gateway configuration error: {0}")]
    Configuration(String),
}

/// Errors that end an order placement, listing or lookup.
///
/// A declined charge is not an error here: placement still succeeds and
/// reports `PlacementOutcome::ChargeDeclined`.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Domain rule violated (missing fields, invalid payment transition).
    #[error(transparent)]
    Order(#[from] OrderError),

    /// The session holds no cart to check out.
    #[error("No cart in session")]
    MissingCart,

    /// Reading or writing the order store failed.
    #[error("Order store error: {0}")]
    Persistence(#[from] OrderStoreError),

    /// The card was charged but the paid order could not be saved.
    #[error("Payment for order {order_id} succeeded but was not recorded: {source}")]
    PaymentNotRecorded {
        order_id: OrderId,
        source: OrderStoreError,
    },
}

impl CheckoutError {
    /// True when the caller sent an incomplete checkout form.
    pub fn is_validation(&self) -> bool {
        matches!(self, CheckoutError::Order(OrderError::MissingFields))
    }
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
