//! Order placement workflow.

use domain::{
    Cart, CustomerId, Order, OrderEvent, OrderId, PaymentState, PaymentType, PlaceOrder,
    PlacedOrder,
};
use order_store::{OrderStore, SortDirection};

use crate::error::{CheckoutError, Result};
use crate::services::notifier::Notifier;
use crate::services::payment::{ChargeRequest, PaymentGateway};

pub const DEFAULT_CURRENCY: &str = "inr";

/// How a placement ended when it did not fail.
///
/// Any outcome means the session cart has been consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementOutcome {
    /// Non-card order stored unpaid.
    Placed(PlacedOrder),
    /// Card charged, payment recorded, `orderPlaced` published.
    Paid(PlacedOrder),
    /// Card charge failed; the order stays unpaid. Reported to the customer
    /// exactly like `Paid`.
    ChargeDeclined { order: PlacedOrder, reason: String },
}

impl PlacementOutcome {
    pub fn order(&self) -> &PlacedOrder {
        match self {
            PlacementOutcome::Placed(order)
            | PlacementOutcome::Paid(order)
            | PlacementOutcome::ChargeDeclined { order, .. } => order,
        }
    }

    /// The message shown to the customer.
    pub fn message(&self) -> &'static str {
        match self {
            PlacementOutcome::Placed(_) => "Order placed successfully",
            PlacementOutcome::Paid(_) | PlacementOutcome::ChargeDeclined { .. } => {
                "Payment successful, Order placed successfully"
            }
        }
    }
}

/// Result of looking up a single order for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowOutcome {
    Render(Order),
    /// Missing, unreadable or someone else's order.
    RedirectHome,
}

/// Places, lists and shows a customer's orders.
///
/// The store, gateway and notifier are injected; the workflow holds no
/// per-request state.
pub struct OrderPlacementWorkflow<S, P, N>
where
    S: OrderStore,
    P: PaymentGateway,
    N: Notifier,
{
    store: S,
    gateway: P,
    notifier: N,
    currency: String,
}

impl<S, P, N> OrderPlacementWorkflow<S, P, N>
where
    S: OrderStore,
    P: PaymentGateway,
    N: Notifier,
{
    pub fn new(store: S, gateway: P, notifier: N) -> Self {
        Self {
            store,
            gateway,
            notifier,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    /// Charges in `currency` instead of INR.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into().to_lowercase();
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Places an order from `cart`.
    ///
    /// On `Ok` the caller clears the cart. On `Err` the cart must be kept,
    /// including the `PaymentNotRecorded` case where the card was charged.
    #[tracing::instrument(
        skip(self, cmd, cart),
        fields(customer_id = %cmd.customer_id, payment_type = ?cmd.payment_type)
    )]
    pub async fn place(&self, cmd: PlaceOrder, cart: Option<&Cart>) -> Result<PlacementOutcome> {
        let start = std::time::Instant::now();
        let outcome = self.run_placement(&cmd, cart).await;
        metrics::histogram!("order_placement_duration_seconds")
            .record(start.elapsed().as_secs_f64());

        match &outcome {
            Ok(result) => {
                let payment = cmd.payment_type.map(|t| t.as_str()).unwrap_or("none");
                metrics::counter!("orders_placed_total", "payment_type" => payment).increment(1);
                tracing::info!(order_id = %result.order().id(), "order placed");
            }
            Err(e) if e.is_validation() => {
                tracing::debug!(error = %e, "checkout form rejected");
            }
            Err(e) => {
                tracing::error!(error = %e, "order placement failed");
            }
        }
        outcome
    }

    async fn run_placement(
        &self,
        cmd: &PlaceOrder,
        cart: Option<&Cart>,
    ) -> Result<PlacementOutcome> {
        // 1. Validate the form
        cmd.validate()?;
        let cart = cart.ok_or(CheckoutError::MissingCart)?;

        // 2. Persist the unpaid order
        let order = self.store.create(cmd.new_order(cart)).await?;

        // 3. Resolve the customer reference
        let placed = self.store.populate_customer(order).await?;

        if !cmd.is_card() {
            return Ok(PlacementOutcome::Placed(placed));
        }

        // 4. Charge the card
        let payment = placed
            .order
            .payment_state()
            .transition(PaymentState::ChargePending)?;
        let request = ChargeRequest {
            amount_minor_units: cart.total_price.minor_units(),
            currency: self.currency.clone(),
            token: cmd.stripe_token.clone().unwrap_or_default(),
            description: format!("Pizza order: {}", placed.id()),
        };

        match self.gateway.charge(request).await {
            Ok(charge) => {
                payment.transition(PaymentState::Paid)?;
                tracing::info!(order_id = %placed.id(), charge_id = %charge.charge_id, "card charged");
                self.record_payment(placed).await
            }
            Err(e) => {
                payment.transition(PaymentState::Unpaid)?;
                metrics::counter!("order_payments_total", "outcome" => "declined").increment(1);
                // The customer still sees the success message; the order is left unpaid.
                tracing::warn!(
                    order_id = %placed.id(),
                    error = %e,
                    "card charge failed, order accepted unpaid"
                );
                Ok(PlacementOutcome::ChargeDeclined {
                    order: placed,
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Second write: marks the order paid and publishes `orderPlaced`.
    async fn record_payment(&self, placed: PlacedOrder) -> Result<PlacementOutcome> {
        let PlacedOrder {
            mut order,
            customer,
        } = placed;
        let order_id = order.id;
        order.mark_paid(PaymentType::Card)?;

        let saved = match self.store.save(order).await {
            Ok(saved) => saved,
            Err(source) => {
                metrics::counter!("order_payments_total", "outcome" => "unrecorded")
                    .increment(1);
                return Err(CheckoutError::PaymentNotRecorded { order_id, source });
            }
        };
        metrics::counter!("order_payments_total", "outcome" => "paid").increment(1);

        let paid = PlacedOrder::new(saved, customer);
        self.notifier.publish(OrderEvent::OrderPlaced(paid.clone()));
        Ok(PlacementOutcome::Paid(paid))
    }

    /// Lists the customer's orders, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn index(&self, customer_id: CustomerId) -> Result<Vec<Order>> {
        self.store
            .find_by_customer(customer_id, SortDirection::Descending)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "failed to fetch orders");
                CheckoutError::from(e)
            })
    }

    /// Loads an order for display if `customer_id` owns it.
    #[tracing::instrument(skip(self))]
    pub async fn show(&self, customer_id: CustomerId, order_id: OrderId) -> ShowOutcome {
        match self.store.find_by_id(order_id).await {
            Ok(Some(order)) if order.is_owned_by(&customer_id) => ShowOutcome::Render(order),
            Ok(Some(_)) => {
                tracing::debug!("order belongs to another customer");
                ShowOutcome::RedirectHome
            }
            Ok(None) => {
                tracing::debug!("order not found");
                ShowOutcome::RedirectHome
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch order");
                ShowOutcome::RedirectHome
            }
        }
    }
}
