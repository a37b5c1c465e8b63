use async_trait::async_trait;
use domain::{CartItem, Customer, NewOrder, Order, OrderStatus, PaymentType, PlacedOrder};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    CustomerId, OrderId, OrderStoreError, Result,
    store::{OrderStore, SortDirection},
};

const ORDER_COLUMNS: &str = "id, customer_id, items, phone, address, payment_status, payment_type, status, created_at, updated_at";

/// PostgreSQL-backed order store implementation.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` and returns a store over the new pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let items_json: serde_json::Value = row.try_get("items")?;
        let items: Vec<CartItem> = serde_json::from_value(items_json)?;
        let payment_type: Option<PaymentType> = row
            .try_get::<Option<String>, _>("payment_type")?
            .map(|s| s.parse::<PaymentType>())
            .transpose()?;
        let status: String = row.try_get("status")?;

        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            customer_id: CustomerId::from_uuid(row.try_get::<Uuid, _>("customer_id")?),
            items,
            phone: row.try_get("phone")?,
            address: row.try_get("address")?,
            payment_status: row.try_get("payment_status")?,
            payment_type,
            status: status.parse::<OrderStatus>()?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    #[tracing::instrument(skip(self, new_order), fields(customer_id = %new_order.customer_id))]
    async fn create(&self, new_order: NewOrder) -> Result<Order> {
        let start = std::time::Instant::now();
        let items = serde_json::to_value(&new_order.items)?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO orders (id, customer_id, items, phone, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(OrderId::new().as_uuid())
        .bind(new_order.customer_id.as_uuid())
        .bind(items)
        .bind(&new_order.phone)
        .bind(&new_order.address)
        .fetch_one(&self.pool)
        .await?;

        metrics::histogram!("order_store_query_duration_seconds", "op" => "create")
            .record(start.elapsed().as_secs_f64());
        Self::row_to_order(row)
    }

    async fn populate_customer(&self, order: Order) -> Result<PlacedOrder> {
        let row = sqlx::query("SELECT id, name, email FROM customers WHERE id = $1")
            .bind(order.customer_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        let customer = match row {
            Some(row) => Some(Customer {
                id: CustomerId::from_uuid(row.try_get::<Uuid, _>("id")?),
                name: row.try_get("name")?,
                email: row.try_get("email")?,
            }),
            None => None,
        };
        Ok(PlacedOrder::new(order, customer))
    }

    #[tracing::instrument(skip(self, order), fields(order_id = %order.id))]
    async fn save(&self, order: Order) -> Result<Order> {
        let start = std::time::Instant::now();
        let items = serde_json::to_value(&order.items)?;

        let row = sqlx::query(&format!(
            r#"
            UPDATE orders
            SET items = $2, phone = $3, address = $4, payment_status = $5,
                payment_type = $6, status = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(order.id.as_uuid())
        .bind(items)
        .bind(&order.phone)
        .bind(&order.address)
        .bind(order.payment_status)
        .bind(order.payment_type.map(|t| t.as_str()))
        .bind(order.status.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(OrderStoreError::OrderNotFound(order.id))?;

        metrics::histogram!("order_store_query_duration_seconds", "op" => "save")
            .record(start.elapsed().as_secs_f64());
        Self::row_to_order(row)
    }

    async fn find_by_customer(
        &self,
        customer_id: CustomerId,
        sort: SortDirection,
    ) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE customer_id = $1 ORDER BY created_at {}",
            sort.as_sql()
        ))
        .bind(customer_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn find_by_id(&self, order_id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(order_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn upsert_customer(&self, customer: Customer) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO customers (id, name, email)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, email = EXCLUDED.email
            "#,
        )
        .bind(customer.id.as_uuid())
        .bind(&customer.name)
        .bind(&customer.email)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
