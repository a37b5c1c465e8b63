//! Customer order endpoints.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRequest, Path, Request, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Form, Json};
use checkout::{Notifier, OrderPlacementWorkflow, PaymentGateway, ShowOutcome};
use domain::{OrderId, PlaceOrder};
use order_store::OrderStore;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::session::{CurrentCustomer, SessionId, SessionStore};
use crate::views::ViewRenderer;

/// The workflow with its collaborators chosen at startup.
pub type SharedWorkflow =
    OrderPlacementWorkflow<Arc<dyn OrderStore>, Arc<dyn PaymentGateway>, Arc<dyn Notifier>>;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub workflow: SharedWorkflow,
    pub sessions: Arc<dyn SessionStore>,
    pub views: Arc<dyn ViewRenderer>,
}

// -- Request types --

/// Checkout form. Every field is optional on the wire so that missing
/// values reach validation instead of failing deserialization.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaceOrderRequest {
    pub phone: Option<String>,
    pub address: Option<String>,
    pub stripe_token: Option<String>,
    pub payment_type: Option<String>,
}

/// Checkout body, accepted as JSON or as a urlencoded form post.
///
/// A body that cannot be read is treated as an empty form, so it fails
/// validation like any other incomplete checkout.
pub struct CheckoutForm(pub PlaceOrderRequest);

impl<S: Send + Sync> FromRequest<S> for CheckoutForm {
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let urlencoded = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        let parsed = if urlencoded {
            Form::<PlaceOrderRequest>::from_request(req, state)
                .await
                .map(|Form(body)| body)
                .map_err(|rejection| rejection.body_text())
        } else {
            Json::<PlaceOrderRequest>::from_request(req, state)
                .await
                .map(|Json(body)| body)
                .map_err(|rejection| rejection.body_text())
        };

        Ok(Self(parsed.unwrap_or_else(|reason| {
            tracing::debug!(%reason, "unreadable checkout body");
            PlaceOrderRequest::default()
        })))
    }
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

// -- Handlers --

/// POST /orders — place an order from the session cart.
#[tracing::instrument(skip_all, fields(customer_id = %customer.0))]
pub async fn store(
    State(state): State<Arc<AppState>>,
    customer: CurrentCustomer,
    session: SessionId,
    CheckoutForm(req): CheckoutForm,
) -> Result<Json<MessageResponse>, ApiError> {
    let cart = match &session.0 {
        Some(sid) => state.sessions.cart(sid).await,
        None => None,
    };

    let cmd = PlaceOrder::new(
        customer.0,
        req.phone.unwrap_or_default(),
        req.address.unwrap_or_default(),
    )
    .with_raw_payment_type(req.payment_type.as_deref())
    .with_stripe_token(req.stripe_token);

    let outcome = state.workflow.place(cmd, cart.as_ref()).await?;

    if let Some(sid) = &session.0 {
        state.sessions.clear_cart(sid).await;
    }

    Ok(Json(MessageResponse {
        message: outcome.message(),
    }))
}

/// GET /orders — the customer's order history, never cached.
#[tracing::instrument(skip_all, fields(customer_id = %customer.0))]
pub async fn index(
    State(state): State<Arc<AppState>>,
    customer: CurrentCustomer,
) -> Result<Response, ApiError> {
    let orders = state.workflow.index(customer.0).await?;
    let html = state.views.order_list(&orders)?;
    Ok(([(CACHE_CONTROL, "no-store")], Html(html)).into_response())
}

/// GET /orders/{id} — one order, or a redirect home for anything the
/// customer may not see.
#[tracing::instrument(skip_all, fields(customer_id = %customer.0, order_id = %id))]
pub async fn show(
    State(state): State<Arc<AppState>>,
    customer: CurrentCustomer,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let Ok(order_id) = id.parse::<OrderId>() else {
        tracing::debug!("malformed order id");
        return Ok(Redirect::to("/").into_response());
    };

    match state.workflow.show(customer.0, order_id).await {
        ShowOutcome::Render(order) => Ok(Html(state.views.order_detail(&order)?).into_response()),
        ShowOutcome::RedirectHome => Ok(Redirect::to("/").into_response()),
    }
}
