//! Payment gateway trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::PaymentError;

/// A single charge against a card token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeRequest {
    /// Amount in the currency's minor unit (paise for INR).
    pub amount_minor_units: i64,
    /// Lowercase ISO currency code, e.g. "inr".
    pub currency: String,
    /// Card token from the client-side payment form.
    pub token: String,
    pub description: String,
}

/// Result of a successful charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeResult {
    /// The charge ID assigned by the processor.
    pub charge_id: String,
}

/// Trait for card payment processors.
///
/// `charge` fails on decline or transport error; callers get no
/// idempotency or retry guarantee.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, request: ChargeRequest) -> Result<ChargeResult, PaymentError>;
}

#[async_trait]
impl<T: PaymentGateway + ?Sized> PaymentGateway for Arc<T> {
    async fn charge(&self, request: ChargeRequest) -> Result<ChargeResult, PaymentError> {
        (**self).charge(request).await
    }
}

#[derive(Debug, Default)]
struct InMemoryGatewayState {
    charges: Vec<(String, ChargeRequest)>,
    attempts: Vec<ChargeRequest>,
    next_id: u32,
    decline: bool,
}

/// In-memory payment gateway for testing and local runs.
///
/// Approves every charge with a non-empty token unless told to decline.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentGateway {
    state: Arc<RwLock<InMemoryGatewayState>>,
}

impl InMemoryPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the gateway to decline subsequent charges.
    pub fn set_decline(&self, decline: bool) {
        if let Ok(mut state) = self.state.write() {
            state.decline = decline;
        }
    }

    /// Returns the number of approved charges.
    pub fn charge_count(&self) -> usize {
        self.state.read().map(|s| s.charges.len()).unwrap_or(0)
    }

    /// Every request received, approved or not, in arrival order.
    pub fn attempts(&self) -> Vec<ChargeRequest> {
        self.state
            .read()
            .map(|s| s.attempts.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    async fn charge(&self, request: ChargeRequest) -> Result<ChargeResult, PaymentError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| PaymentError::Configuration("gateway state poisoned".to_string()))?;
        state.attempts.push(request.clone());

        if state.decline {
            return Err(PaymentError::Declined("Your card was declined.".to_string()));
        }
        if request.token.is_empty() {
            return Err(PaymentError::Declined("No card token supplied.".to_string()));
        }

        state.next_id += 1;
        let charge_id = format!("ch_{:04}", state.next_id);
        state.charges.push((charge_id.clone(), request));

        Ok(ChargeResult { charge_id })
    }
}
