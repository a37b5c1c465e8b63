//! HTML views for the customer's orders.
//!
//! Pages are minijinja templates compiled in at build time. Template names
//! end in `.html`, so every interpolated value is HTML-escaped.

use domain::{Order, PaymentState};
use minijinja::{Environment, context};
use serde::Serialize;

/// Errors raised while rendering a page.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// Renders order pages.
pub trait ViewRenderer: Send + Sync {
    /// The customer's order history.
    fn order_list(&self, orders: &[Order]) -> Result<String, ViewError>;

    /// A single order with its line items.
    fn order_detail(&self, order: &Order) -> Result<String, ViewError>;
}

const ORDER_LIST: &str = "orders.html";
const ORDER_DETAIL: &str = "order.html";

const TIME_FORMAT: &str = "%I:%M %p";
const DATE_FORMAT: &str = "%d %b %Y";

/// Server-side renderer over the bundled templates.
pub struct HtmlRenderer {
    env: Environment<'static>,
}

impl HtmlRenderer {
    /// Loads and compiles the bundled templates.
    pub fn new() -> Result<Self, ViewError> {
        let mut env = Environment::new();
        env.add_template("layout.html", include_str!("../templates/layout.html"))?;
        env.add_template(ORDER_LIST, include_str!("../templates/orders.html"))?;
        env.add_template(ORDER_DETAIL, include_str!("../templates/order.html"))?;
        Ok(Self { env })
    }
}

#[derive(Serialize)]
struct OrderRow<'a> {
    id: String,
    phone: &'a str,
    address: &'a str,
    payment: &'static str,
    time: String,
}

#[derive(Serialize)]
struct ItemRow<'a> {
    name: &'a str,
    size: &'a str,
    qty: u32,
    price: String,
}

#[derive(Serialize)]
struct OrderPage<'a> {
    id: String,
    status: String,
    date: String,
    time: String,
    payment: &'static str,
    items: Vec<ItemRow<'a>>,
    total: String,
    phone: &'a str,
    address: &'a str,
}

fn payment_label(order: &Order) -> &'static str {
    match order.payment_state() {
        PaymentState::Paid => "Paid",
        _ => "Not paid",
    }
}

impl<'a> From<&'a Order> for OrderRow<'a> {
    fn from(order: &'a Order) -> Self {
        Self {
            id: order.id.to_string(),
            phone: &order.phone,
            address: &order.address,
            payment: payment_label(order),
            time: order.created_at.format(TIME_FORMAT).to_string(),
        }
    }
}

impl<'a> From<&'a Order> for OrderPage<'a> {
    fn from(order: &'a Order) -> Self {
        Self {
            id: order.id.to_string(),
            status: order.status.to_string(),
            date: order.created_at.format(DATE_FORMAT).to_string(),
            time: order.created_at.format(TIME_FORMAT).to_string(),
            payment: payment_label(order),
            items: order
                .items
                .iter()
                .map(|item| ItemRow {
                    name: &item.name,
                    size: &item.size,
                    qty: item.qty,
                    price: item.line_total().to_string(),
                })
                .collect(),
            total: order.items_total().to_string(),
            phone: &order.phone,
            address: &order.address,
        }
    }
}

impl ViewRenderer for HtmlRenderer {
    fn order_list(&self, orders: &[Order]) -> Result<String, ViewError> {
        let rows: Vec<OrderRow<'_>> = orders.iter().map(OrderRow::from).collect();
        let html = self
            .env
            .get_template(ORDER_LIST)?
            .render(context! { orders => rows })?;
        Ok(html)
    }

    fn order_detail(&self, order: &Order) -> Result<String, ViewError> {
        let html = self
            .env
            .get_template(ORDER_DETAIL)?
            .render(context! { order => OrderPage::from(order) })?;
        Ok(html)
    }
}
