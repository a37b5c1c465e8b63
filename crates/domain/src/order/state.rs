//! Payment sub-state machine and the enums persisted on an order.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::OrderError;

/// The payment sub-state of an order during placement.
///
/// State transitions:
/// ```text
/// Unpaid ──► ChargePending ──┬──► Paid
///                            └──► Unpaid   (charge failed)
/// ```
///
/// There is no transition out of `Paid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentState {
    #[default]
    Unpaid,

    /// A charge request is in flight with the payment gateway.
    ChargePending,

    /// The gateway confirmed the charge (terminal).
    Paid,
}

impl PaymentState {
    /// Returns true if a charge may be started from this state.
    pub fn can_begin_charge(&self) -> bool {
        matches!(self, PaymentState::Unpaid)
    }

    /// Returns true if this state may move to `next`.
    pub fn can_transition_to(&self, next: PaymentState) -> bool {
        matches!(
            (self, next),
            (PaymentState::Unpaid, PaymentState::ChargePending)
                | (PaymentState::ChargePending, PaymentState::Paid)
                | (PaymentState::ChargePending, PaymentState::Unpaid)
        )
    }

    /// Moves to `next`, rejecting transitions the state machine does not allow.
    pub fn transition(self, next: PaymentState) -> Result<PaymentState, OrderError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(OrderError::InvalidPaymentTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentState::Paid)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentState::Unpaid => "Unpaid",
            PaymentState::ChargePending => "ChargePending",
            PaymentState::Paid => "Paid",
        }
    }
}

impl std::fmt::Display for PaymentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the customer chose to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Card,
    /// Cash on delivery.
    Cod,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Card => "card",
            PaymentType::Cod => "cod",
        }
    }
}

impl FromStr for PaymentType {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(PaymentType::Card),
            "cod" => Ok(PaymentType::Cod),
            other => Err(OrderError::UnknownPaymentType(other.to_string())),
        }
    }
}

impl std::fmt::Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kitchen/delivery status shown to the customer. Placement always
/// starts at `OrderPlaced`; later stages are driven elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    OrderPlaced,
    Confirmed,
    Prepared,
    Delivered,
    Completed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::OrderPlaced => "order_placed",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Prepared => "prepared",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Completed => "completed",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "order_placed" => Ok(OrderStatus::OrderPlaced),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "prepared" => Ok(OrderStatus::Prepared),
            "delivered" => Ok(OrderStatus::Delivered),
            "completed" => Ok(OrderStatus::Completed),
            other => Err(OrderError::UnknownStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
