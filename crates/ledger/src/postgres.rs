use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, QueryBuilder, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    CustomerRef, LineItem, Order, OrderFilter, OrderId, OrderPatch, OrderStore, PageRequest,
    PageResult, RecipientInfo, Result, StoreError,
};

const ORDER_COLUMNS: &str = "id, customer, line_items, total_amount, shipping_fee, \
     shipping_address, recipient, payment_method, payment_status, status, note, voucher, \
     created_at, updated_at";

/// PostgreSQL-backed order store.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let line_items: Vec<LineItem> =
            serde_json::from_value(row.try_get::<serde_json::Value, _>("line_items")?)?;
        let recipient: RecipientInfo =
            serde_json::from_value(row.try_get::<serde_json::Value, _>("recipient")?)?;

        let customer: String = row.try_get("customer")?;
        let payment_method: String = row.try_get("payment_method")?;
        let payment_status: String = row.try_get("payment_status")?;
        let status: String = row.try_get("status")?;

        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            customer: CustomerRef::from_stored(&customer),
            line_items,
            total_amount: common::Money::new(row.try_get("total_amount")?),
            shipping_fee: common::Money::new(row.try_get("shipping_fee")?),
            shipping_address: row.try_get("shipping_address")?,
            recipient,
            payment_method: payment_method.parse().map_err(|_| StoreError::Corrupt {
                column: "payment_method",
                value: payment_method.clone(),
            })?,
            payment_status: payment_status.parse().map_err(|_| StoreError::Corrupt {
                column: "payment_status",
                value: payment_status.clone(),
            })?,
            status: status.parse().map_err(|_| StoreError::Corrupt {
                column: "status",
                value: status.clone(),
            })?,
            note: row.try_get("note")?,
            voucher: row.try_get("voucher")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn insert(&self, order: Order) -> Result<()> {
        let line_items = serde_json::to_value(&order.line_items)?;
        let recipient = serde_json::to_value(&order.recipient)?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, customer, line_items, total_amount, shipping_fee,
                shipping_address, recipient, payment_method, payment_status, status,
                note, voucher, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.customer.storage_key())
        .bind(line_items)
        .bind(order.total_amount.amount())
        .bind(order.shipping_fee.amount())
        .bind(&order.shipping_address)
        .bind(recipient)
        .bind(order.payment_method.as_str())
        .bind(order.payment_status.as_str())
        .bind(order.status.as_str())
        .bind(&order.note)
        .bind(&order.voucher)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn update(&self, id: OrderId, patch: OrderPatch) -> Result<Option<Order>> {
        let mut builder: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("UPDATE orders SET updated_at = ");
        builder.push_bind(Utc::now());

        if let Some(status) = patch.status {
            builder.push(", status = ").push_bind(status.as_str());
        }
        if let Some(method) = patch.payment_method {
            builder.push(", payment_method = ").push_bind(method.as_str());
        }
        if let Some(address) = patch.shipping_address {
            builder.push(", shipping_address = ").push_bind(address);
        }
        if let Some(fee) = patch.shipping_fee {
            builder.push(", shipping_fee = ").push_bind(fee.amount());
        }
        if let Some(note) = patch.note {
            builder.push(", note = ").push_bind(note);
        }
        if let Some(total) = patch.total_amount {
            builder.push(", total_amount = ").push_bind(total.amount());
        }

        builder.push(" WHERE id = ").push_bind(id.as_uuid());
        builder.push(format!(" RETURNING {ORDER_COLUMNS}"));

        let row = builder.build().fetch_optional(&self.pool).await?;
        row.map(Self::row_to_order).transpose()
    }

    async fn delete(&self, id: OrderId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_customer(&self, customer_key: &str) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE customer = $1 ORDER BY created_at DESC"
        ))
        .bind(customer_key)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn list(&self, filter: OrderFilter, page: PageRequest) -> Result<PageResult<Order>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE ($1::text IS NULL OR status = $1)",
        )
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_one(&self.pool)
        .await?;

        // Sort column and direction come from closed enums, never from input.
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE ($1::text IS NULL OR status = $1) \
             ORDER BY {} {} LIMIT $2 OFFSET $3",
            page.sort_by.column(),
            page.sort_order.sql(),
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(i64::try_from(page.limit).unwrap_or(i64::MAX))
        .bind(i64::try_from(page.offset()).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(Self::row_to_order)
            .collect::<Result<Vec<_>>>()?;

        Ok(PageResult {
            items,
            page: page.page,
            limit: page.limit,
            total: total as u64,
        })
    }

    async fn created_in_range(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE ($1::timestamptz IS NULL OR created_at >= $1) \
               AND ($2::timestamptz IS NULL OR created_at <= $2) \
             ORDER BY created_at ASC"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}
