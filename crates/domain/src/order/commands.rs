//! The checkout command.

use common::CustomerId;
use serde::{Deserialize, Serialize};

use super::{Cart, NewOrder, OrderError, PaymentType};

/// Place an order for the authenticated customer from their cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrder {
    pub customer_id: CustomerId,
    pub phone: String,
    pub address: String,
    /// Opaque token from the card form; only meaningful for card payments.
    pub stripe_token: Option<String>,
    /// `None` when the request named no payment type or one we don't know.
    pub payment_type: Option<PaymentType>,
}

impl PlaceOrder {
    pub fn new(
        customer_id: CustomerId,
        phone: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            customer_id,
            phone: phone.into(),
            address: address.into(),
            stripe_token: None,
            payment_type: None,
        }
    }

    /// Pay by card with the given gateway token.
    pub fn with_card(mut self, token: impl Into<String>) -> Self {
        self.payment_type = Some(PaymentType::Card);
        self.stripe_token = Some(token.into());
        self
    }

    /// Pay cash on delivery.
    pub fn with_cash_on_delivery(mut self) -> Self {
        self.payment_type = Some(PaymentType::Cod);
        self.stripe_token = None;
        self
    }

    /// Sets the payment type from the raw form value. Anything other than a
    /// known type leaves it unset.
    pub fn with_raw_payment_type(mut self, raw: Option<&str>) -> Self {
        self.payment_type = raw.and_then(|s| s.parse().ok());
        self
    }

    pub fn with_stripe_token(mut self, token: Option<String>) -> Self {
        self.stripe_token = token;
        self
    }

    /// Both phone and address must be present; any non-empty value passes.
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.phone.is_empty() || self.address.is_empty() {
            return Err(OrderError::MissingFields);
        }
        Ok(())
    }

    pub fn is_card(&self) -> bool {
        self.payment_type == Some(PaymentType::Card)
    }

    /// The fields to persist for this checkout.
    pub fn new_order(&self, cart: &Cart) -> NewOrder {
        NewOrder {
            customer_id: self.customer_id,
            items: cart.items.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
        }
    }
}
