//! Request identity and session cart access.
//!
//! Authentication and cart management live upstream. This module only reads
//! the identity an auth proxy forwards and the cart keyed by session id.

use std::collections::HashMap;
use std::convert::Infallible;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use domain::{Cart, CustomerId};
use tokio::sync::RwLock;

use crate::error::ApiError;

pub const CUSTOMER_ID_HEADER: &str = "x-customer-id";
pub const SESSION_ID_HEADER: &str = "x-session-id";

/// The authenticated customer making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentCustomer(pub CustomerId);

impl<S: Send + Sync> FromRequestParts<S> for CurrentCustomer {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(CUSTOMER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .map(CurrentCustomer)
            .ok_or(ApiError::Unauthorized)
    }
}

/// The caller's session id, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for SessionId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(SessionId(
            parts
                .headers
                .get(SESSION_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(str::to_string),
        ))
    }
}

/// Cart storage keyed by session id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn cart(&self, session_id: &str) -> Option<Cart>;

    async fn set_cart(&self, session_id: &str, cart: Cart);

    /// Removes the cart; a no-op if there is none.
    async fn clear_cart(&self, session_id: &str);
}

/// Process-local session store.
#[derive(Default)]
pub struct InMemorySessionStore {
    carts: RwLock<HashMap<String, Cart>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn cart(&self, session_id: &str) -> Option<Cart> {
        self.carts.read().await.get(session_id).cloned()
    }

    async fn set_cart(&self, session_id: &str, cart: Cart) {
        self.carts
            .write()
            .await
            .insert(session_id.to_string(), cart);
    }

    async fn clear_cart(&self, session_id: &str) {
        self.carts.write().await.remove(session_id);
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;
    use domain::{CartItem, Money};

    use super::*;

    fn parts_with(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/orders");
        for (k, v) in headers {
            builder = builder.header(*k, *v);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_current_customer_from_header() {
        let id = CustomerId::new();
        let mut parts = parts_with(&[(CUSTOMER_ID_HEADER, &id.to_string())]);
        let customer = CurrentCustomer::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(customer.0, id);
    }

    #[tokio::test]
    async fn test_current_customer_missing_or_invalid() {
        let mut parts = parts_with(&[]);
        assert!(matches!(
            CurrentCustomer::from_request_parts(&mut parts, &()).await,
            Err(ApiError::Unauthorized)
        ));

        let mut parts = parts_with(&[(CUSTOMER_ID_HEADER, "nobody")]);
        assert!(matches!(
            CurrentCustomer::from_request_parts(&mut parts, &()).await,
            Err(ApiError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_session_id_optional() {
        let mut parts = parts_with(&[(SESSION_ID_HEADER, "abc")]);
        let sid = SessionId::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(sid.0.as_deref(), Some("abc"));

        let mut parts = parts_with(&[]);
        let sid = SessionId::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(sid.0, None);
    }

    #[tokio::test]
    async fn test_in_memory_session_cart_lifecycle() {
        let sessions = InMemorySessionStore::new();
        assert!(sessions.cart("s1").await.is_none());

        let cart = Cart::from_items(vec![CartItem::new(
            "margherita",
            "Margherita",
            "small",
            Money::from_rupees(150),
            1,
        )]);
        sessions.set_cart("s1", cart.clone()).await;
        assert_eq!(sessions.cart("s1").await, Some(cart));
        assert!(sessions.cart("s2").await.is_none());

        sessions.clear_cart("s1").await;
        assert!(sessions.cart("s1").await.is_none());
        sessions.clear_cart("s1").await;
    }
}
