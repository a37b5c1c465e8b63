//! HTTP API server for pizza order placement.
//!
//! Serves checkout, order history and single-order pages, with structured
//! logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod session;
pub mod views;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use checkout::{
    BroadcastNotifier, InMemoryPaymentGateway, Notifier, OrderPlacementWorkflow, PaymentError,
    PaymentGateway, StripeConfig, StripePaymentGateway,
};
use domain::OrderEvent;
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::{InMemoryOrderStore, OrderStore, OrderStoreError, PostgresOrderStore};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

use config::Config;
use routes::orders::AppState;
use session::{InMemorySessionStore, SessionStore};
use views::{HtmlRenderer, ViewError};

/// Errors raised while wiring the application at startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("order store: {0}")]
    Store(#[from] OrderStoreError),

    #[error("payment gateway: {0}")]
    Payment(#[from] PaymentError),

    #[error("views: {0}")]
    Views(#[from] ViewError),
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::system::metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/orders", post(routes::orders::store))
        .route("/orders", get(routes::orders::index))
        .route("/orders/{id}", get(routes::orders::show))
        .with_state(state)
        .merge(metrics_router)
        .layer(TraceLayer::new_for_http())
}

/// Assembles handler state from its collaborators.
pub fn build_state(
    store: Arc<dyn OrderStore>,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn Notifier>,
    sessions: Arc<dyn SessionStore>,
    currency: &str,
) -> Result<Arc<AppState>, StartupError> {
    Ok(Arc::new(AppState {
        workflow: OrderPlacementWorkflow::new(store, gateway, notifier).with_currency(currency),
        sessions,
        views: Arc::new(HtmlRenderer::new()?),
    }))
}

/// Fully in-memory components, with handles kept for inspection.
#[derive(Clone, Default)]
pub struct InMemoryComponents {
    pub store: InMemoryOrderStore,
    pub gateway: Arc<InMemoryPaymentGateway>,
    pub notifier: Arc<BroadcastNotifier>,
    pub sessions: Arc<InMemorySessionStore>,
}

impl InMemoryComponents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Result<Arc<AppState>, StartupError> {
        build_state(
            Arc::new(self.store.clone()),
            self.gateway.clone(),
            self.notifier.clone(),
            self.sessions.clone(),
            checkout::DEFAULT_CURRENCY,
        )
    }
}

/// Builds application state from configuration.
///
/// Orders go to PostgreSQL when `database_url` is set (migrations run
/// first) and card charges go to Stripe when a private key is set; each
/// falls back to its in-memory implementation otherwise. The returned
/// notifier is the one the workflow publishes to.
pub async fn create_state_from_config(
    config: &Config,
) -> Result<(Arc<AppState>, Arc<BroadcastNotifier>), StartupError> {
    let store: Arc<dyn OrderStore> = match &config.database_url {
        Some(url) => {
            let store = PostgresOrderStore::connect(url).await?;
            store.run_migrations().await?;
            tracing::info!("using PostgreSQL order store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, orders are kept in memory");
            Arc::new(InMemoryOrderStore::new())
        }
    };

    let gateway: Arc<dyn PaymentGateway> = match &config.stripe_private_key {
        Some(key) => {
            let mut stripe = StripeConfig::new(key.clone());
            if let Some(base) = &config.stripe_api_base {
                stripe = stripe.with_api_base(base.clone());
            }
            Arc::new(StripePaymentGateway::new(stripe)?)
        }
        None => {
            tracing::warn!("STRIPE_PRIVATE_KEY not set, card charges are simulated");
            Arc::new(InMemoryPaymentGateway::new())
        }
    };

    let notifier = Arc::new(BroadcastNotifier::default());
    let state = build_state(
        store,
        gateway,
        notifier.clone(),
        Arc::new(InMemorySessionStore::new()),
        &config.currency,
    )?;

    Ok((state, notifier))
}

/// Logs every order event published on `notifier` until it is dropped.
pub fn spawn_order_listener(notifier: &BroadcastNotifier) -> JoinHandle<()> {
    let mut events = notifier.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => log_order_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "order listener lagged behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

fn log_order_event(event: &OrderEvent) {
    let placed = event.order();
    let email = placed.customer.as_ref().map(|c| c.email.as_str());
    tracing::info!(
        event = event.name(),
        order_id = %placed.id(),
        customer = email.unwrap_or("unknown"),
        "order confirmed"
    );
}
