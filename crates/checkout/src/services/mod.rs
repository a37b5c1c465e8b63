//! External collaborators of the placement workflow.

pub mod notifier;
pub mod payment;
pub mod stripe;

pub use notifier::{BroadcastNotifier, Notifier};
pub use payment::{ChargeRequest, ChargeResult, InMemoryPaymentGateway, PaymentGateway};
pub use stripe::{StripeConfig, StripePaymentGateway};
