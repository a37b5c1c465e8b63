//! Integration tests for the API server.

use std::sync::OnceLock;

use api::InMemoryComponents;
use api::session::{CUSTOMER_ID_HEADER, SESSION_ID_HEADER, SessionStore};
use axum::body::Body;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, LOCATION};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use domain::{Cart, CartItem, Customer, CustomerId, Money, NewOrder, Order, PaymentType};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::OrderStore;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

const SESSION: &str = "session-1";

struct TestApp {
    components: InMemoryComponents,
    customer: Customer,
}

impl TestApp {
    async fn new() -> Self {
        let components = InMemoryComponents::new();
        let customer = Customer::new(CustomerId::new(), "Asha", "asha@example.com");
        components
            .store
            .upsert_customer(customer.clone())
            .await
            .unwrap();
        Self {
            components,
            customer,
        }
    }

    fn router(&self) -> axum::Router {
        api::create_app(self.components.state().unwrap(), get_metrics_handle())
    }

    async fn with_cart(self) -> Self {
        let cart = Cart::from_items(vec![
            CartItem::new("margherita", "Margherita", "medium", Money::from_rupees(250), 1),
            CartItem::new("farmhouse", "Farmhouse", "large", Money::from_rupees(125), 2),
        ]);
        self.components.sessions.set_cart(SESSION, cart).await;
        self
    }

    async fn cart(&self) -> Option<Cart> {
        self.components.sessions.cart(SESSION).await
    }

    async fn post_order(&self, body: serde_json::Value) -> Response {
        self.router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/orders")
                    .header(CONTENT_TYPE, "application/json")
                    .header(CUSTOMER_ID_HEADER, self.customer.id.to_string())
                    .header(SESSION_ID_HEADER, SESSION)
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn get_as(&self, uri: &str, customer: CustomerId) -> Response {
        self.router()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .header(CUSTOMER_ID_HEADER, customer.to_string())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn seed_order(&self, customer_id: CustomerId, phone: &str) -> Order {
        self.components
            .store
            .create(NewOrder {
                customer_id,
                items: vec![CartItem::new(
                    "veggie",
                    "Veggie Supreme",
                    "small",
                    Money::from_rupees(199),
                    1,
                )],
                phone: phone.to_string(),
                address: "7 Park Street".to_string(),
            })
            .await
            .unwrap()
    }
}

async fn json_body(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new().await;

    let response = app
        .router()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = TestApp::new().await;

    let response = app
        .router()
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_store_requires_identity() {
    let app = TestApp::new().await.with_cart().await;

    let response = app
        .router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/orders")
                .header(CONTENT_TYPE, "application/json")
                .header(SESSION_ID_HEADER, SESSION)
                .body(Body::from(
                    serde_json::json!({"phone": "9876543210", "address": "12 MG Road"})
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.components.store.order_count().await, 0);
}

#[tokio::test]
async fn test_store_missing_fields_returns_422() {
    let app = TestApp::new().await.with_cart().await;

    let response = app
        .post_order(serde_json::json!({"phone": "9876543210", "address": ""}))
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = json_body(response).await;
    assert_eq!(json["message"], "All fields are required");
    assert_eq!(app.components.store.order_count().await, 0);
    assert!(app.cart().await.is_some());
}

#[tokio::test]
async fn test_store_body_without_content_type_is_incomplete_form() {
    let app = TestApp::new().await.with_cart().await;

    let response = app
        .router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/orders")
                .header(CUSTOMER_ID_HEADER, app.customer.id.to_string())
                .header(SESSION_ID_HEADER, SESSION)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = json_body(response).await;
    assert_eq!(json["message"], "All fields are required");
    assert_eq!(app.components.store.order_count().await, 0);
}

#[tokio::test]
async fn test_store_wrongly_typed_field_is_incomplete_form() {
    let app = TestApp::new().await.with_cart().await;

    let response = app
        .post_order(serde_json::json!({"phone": 98765, "address": "a"}))
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = json_body(response).await;
    assert_eq!(json, serde_json::json!({"message": "All fields are required"}));
    assert!(app.cart().await.is_some());
}

#[tokio::test]
async fn test_store_for_customer_without_stored_record() {
    let components = InMemoryComponents::new();
    let cart = Cart::from_items(vec![CartItem::new(
        "margherita",
        "Margherita",
        "medium",
        Money::from_rupees(250),
        1,
    )]);
    components.sessions.set_cart(SESSION, cart).await;
    let app = api::create_app(components.state().unwrap(), get_metrics_handle());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/orders")
                .header(CONTENT_TYPE, "application/json")
                .header(CUSTOMER_ID_HEADER, CustomerId::new().to_string())
                .header(SESSION_ID_HEADER, SESSION)
                .body(Body::from(
                    serde_json::json!({"phone": "1", "address": "a", "paymentType": "cod"})
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["message"], "Order placed successfully");
    assert_eq!(components.store.order_count().await, 1);
    assert!(components.sessions.cart(SESSION).await.is_none());
}

#[tokio::test]
async fn test_store_cash_order_clears_cart() {
    let app = TestApp::new().await.with_cart().await;

    let response = app
        .post_order(serde_json::json!({
            "phone": "9876543210",
            "address": "12 MG Road",
            "paymentType": "cod"
        }))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["message"], "Order placed successfully");
    assert!(app.cart().await.is_none());
    assert_eq!(app.components.gateway.charge_count(), 0);

    let orders = app.components.store.all_orders().await;
    assert_eq!(orders.len(), 1);
    assert!(!orders[0].payment_status);
    assert_eq!(orders[0].payment_type, None);
    assert_eq!(orders[0].customer_id, app.customer.id);
}

#[tokio::test]
async fn test_store_accepts_urlencoded_form() {
    let app = TestApp::new().await.with_cart().await;

    let response = app
        .router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/orders")
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .header(CUSTOMER_ID_HEADER, app.customer.id.to_string())
                .header(SESSION_ID_HEADER, SESSION)
                .body(Body::from("phone=9876543210&address=12+MG+Road&paymentType=cod"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["message"], "Order placed successfully");
    let orders = app.components.store.all_orders().await;
    assert_eq!(orders[0].address, "12 MG Road");
}

#[tokio::test]
async fn test_store_card_order_is_charged_and_paid() {
    let app = TestApp::new().await.with_cart().await;
    let mut events = app.components.notifier.subscribe();

    let response = app
        .post_order(serde_json::json!({
            "phone": "9876543210",
            "address": "12 MG Road",
            "paymentType": "card",
            "stripeToken": "tok_visa"
        }))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["message"], "Payment successful, Order placed successfully");
    assert!(app.cart().await.is_none());

    let attempts = app.components.gateway.attempts();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].amount_minor_units, 50_000);
    assert_eq!(attempts[0].currency, "inr");
    assert_eq!(attempts[0].token, "tok_visa");

    let orders = app.components.store.all_orders().await;
    assert!(orders[0].payment_status);
    assert_eq!(orders[0].payment_type, Some(PaymentType::Card));

    let event = events.try_recv().unwrap();
    assert_eq!(event.name(), "orderPlaced");
    assert_eq!(event.order().id(), orders[0].id);
}

#[tokio::test]
async fn test_store_declined_charge_still_reports_success() {
    let app = TestApp::new().await.with_cart().await;
    app.components.gateway.set_decline(true);
    let mut events = app.components.notifier.subscribe();

    let response = app
        .post_order(serde_json::json!({
            "phone": "9876543210",
            "address": "12 MG Road",
            "paymentType": "card",
            "stripeToken": "tok_chargeDeclined"
        }))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["message"], "Payment successful, Order placed successfully");
    assert!(app.cart().await.is_none());

    let orders = app.components.store.all_orders().await;
    assert_eq!(orders.len(), 1);
    assert!(!orders[0].payment_status);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_store_unrecorded_payment_keeps_cart() {
    let app = TestApp::new().await.with_cart().await;
    app.components.store.set_fail_on_save(true).await;

    let response = app
        .post_order(serde_json::json!({
            "phone": "9876543210",
            "address": "12 MG Road",
            "paymentType": "card",
            "stripeToken": "tok_visa"
        }))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = json_body(response).await;
    assert_eq!(json["message"], "Order placed but failed to save payment details");
    assert!(app.cart().await.is_some());
    assert_eq!(app.components.gateway.charge_count(), 1);
}

#[tokio::test]
async fn test_store_persistence_failure_returns_generic_500() {
    let app = TestApp::new().await.with_cart().await;
    app.components.store.set_fail_on_create(true).await;

    let response = app
        .post_order(serde_json::json!({"phone": "9876543210", "address": "12 MG Road"}))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = json_body(response).await;
    assert_eq!(json["message"], "Something went wrong");
    assert!(app.cart().await.is_some());
}

#[tokio::test]
async fn test_store_without_cart_returns_500() {
    let app = TestApp::new().await;

    let response = app
        .post_order(serde_json::json!({"phone": "9876543210", "address": "12 MG Road"}))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.components.store.order_count().await, 0);
}

#[tokio::test]
async fn test_index_lists_only_own_orders_uncached() {
    let app = TestApp::new().await;
    let other = CustomerId::new();
    let mine = app.seed_order(app.customer.id, "1111111111").await;
    app.seed_order(other, "2222222222").await;

    let response = app.get_as("/orders", app.customer.id).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CACHE_CONTROL], "no-store");
    assert!(
        response.headers()[CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    let html = text_body(response).await;
    assert!(html.contains(&format!("/orders/{}", mine.id)));
    assert!(html.contains("1111111111"));
    assert!(!html.contains("2222222222"));
}

#[tokio::test]
async fn test_index_empty() {
    let app = TestApp::new().await;

    let response = app.get_as("/orders", app.customer.id).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(text_body(response).await.contains("No orders found!"));
}

#[tokio::test]
async fn test_index_store_failure_returns_500() {
    let app = TestApp::new().await;
    app.components.store.set_fail_on_find(true).await;

    let response = app.get_as("/orders", app.customer.id).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_show_own_order() {
    let app = TestApp::new().await;
    let order = app.seed_order(app.customer.id, "1111111111").await;

    let response = app
        .get_as(&format!("/orders/{}", order.id), app.customer.id)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = text_body(response).await;
    assert!(html.contains("Veggie Supreme"));
    assert!(html.contains("order_placed"));
}

#[tokio::test]
async fn test_show_redirects_home_for_other_customer() {
    let app = TestApp::new().await;
    let order = app.seed_order(app.customer.id, "1111111111").await;

    let response = app
        .get_as(&format!("/orders/{}", order.id), CustomerId::new())
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[LOCATION], "/");
}

#[tokio::test]
async fn test_show_redirects_home_for_unknown_or_malformed_id() {
    let app = TestApp::new().await;

    let response = app
        .get_as(&format!("/orders/{}", domain::OrderId::new()), app.customer.id)
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[LOCATION], "/");

    let response = app.get_as("/orders/not-a-uuid", app.customer.id).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[LOCATION], "/");
}
