use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;
use zeva_order::models::{CustomerInfo, Order, OrderItem, OrderStatus, PaymentStatus};
use zeva_order::repository::OrderRepository;

use crate::database::DbClient;

type RepoError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Clone)]
pub struct PgOrderRepository {
    db: DbClient,
}

impl PgOrderRepository {
    pub fn new(db: DbClient) -> Self {
        Self { db }
    }

    async fn items_for(&self, order_id: Uuid) -> Result<Vec<OrderItem>, RepoError> {
        let rows = sqlx::query("SELECT * FROM order_items WHERE order_id = $1")
            .bind(order_id)
            .fetch_all(&self.db.pool)
            .await?;
        rows.iter().map(item_from_row).collect()
    }

    async fn hydrate(&self, row: Option<PgRow>) -> Result<Option<Order>, RepoError> {
        let Some(row) = row else { return Ok(None) };
        let mut order = order_from_row(&row)?;
        order.items = self.items_for(order.id).await?;
        Ok(Some(order))
    }
}

fn order_from_row(row: &PgRow) -> Result<Order, RepoError> {
    let status: String = row.try_get("status")?;
    let payment_status: String = row.try_get("payment_status")?;
    Ok(Order {
        id: row.try_get("id")?,
        order_number: row.try_get("order_number")?,
        user_id: row.try_get("user_id")?,
        customer: CustomerInfo {
            name: row.try_get("customer_name")?,
            email: row.try_get("customer_email")?,
            phone: row.try_get("customer_phone")?,
            shipping_address: row.try_get("shipping_address")?,
        },
        total_amount_paisa: row.try_get("total_amount_paisa")?,
        status: OrderStatus::parse(&status)
            .ok_or_else(|| format!("unknown order status {status:?}"))?,
        payment_method: row.try_get("payment_method")?,
        payment_status: PaymentStatus::parse(&payment_status)
            .ok_or_else(|| format!("unknown payment status {payment_status:?}"))?,
        transaction_ref: row.try_get("transaction_ref")?,
        items: Vec::new(),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn item_from_row(row: &PgRow) -> Result<OrderItem, RepoError> {
    Ok(OrderItem {
        id: row.try_get("id")?,
        order_id: row.try_get("order_id")?,
        product_id: row.try_get("product_id")?,
        product_name: row.try_get("product_name")?,
        quantity: row.try_get("quantity")?,
        unit_price_paisa: row.try_get("unit_price_paisa")?,
    })
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    /// Header and lines land in one transaction; a failed line insert rolls
    /// the whole order back.
    async fn create_order(&self, order: &Order) -> Result<(), RepoError> {
        let mut tx = self.db.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders
                (id, order_number, user_id, customer_name, customer_email,
                 customer_phone, shipping_address, total_amount_paisa, status,
                 payment_method, payment_status, transaction_ref, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(order.id)
        .bind(&order.order_number)
        .bind(order.user_id)
        .bind(&order.customer.name)
        .bind(&order.customer.email)
        .bind(&order.customer.phone)
        .bind(&order.customer.shipping_address)
        .bind(order.total_amount_paisa)
        .bind(order.status.as_str())
        .bind(&order.payment_method)
        .bind(order.payment_status.as_str())
        .bind(&order.transaction_ref)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in &order.items {
            sqlx::query(
                r#"
                INSERT INTO order_items
                    (id, order_id, product_id, product_name, quantity, unit_price_paisa)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(item.id)
            .bind(item.order_id)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(item.unit_price_paisa)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>, RepoError> {
        let row = sqlx::query("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db.pool)
            .await?;
        self.hydrate(row).await
    }

    async fn get_order_by_number(&self, order_number: &str) -> Result<Option<Order>, RepoError> {
        let row = sqlx::query("SELECT * FROM orders WHERE order_number = $1")
            .bind(order_number)
            .fetch_optional(&self.db.pool)
            .await?;
        self.hydrate(row).await
    }

    async fn get_order_by_transaction(
        &self,
        transaction_ref: &str,
    ) -> Result<Option<Order>, RepoError> {
        let row = sqlx::query("SELECT * FROM orders WHERE transaction_ref = $1")
            .bind(transaction_ref)
            .fetch_optional(&self.db.pool)
            .await?;
        self.hydrate(row).await
    }

    async fn list_orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, RepoError> {
        let rows = sqlx::query("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC")
            .bind(user_id)
            .fetch_all(&self.db.pool)
            .await?;
        let mut orders = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut order = order_from_row(row)?;
            order.items = self.items_for(order.id).await?;
            orders.push(order);
        }
        Ok(orders)
    }

    async fn list_orders(&self) -> Result<Vec<Order>, RepoError> {
        let rows = sqlx::query("SELECT * FROM orders ORDER BY created_at DESC")
            .fetch_all(&self.db.pool)
            .await?;
        let mut orders = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut order = order_from_row(row)?;
            order.items = self.items_for(order.id).await?;
            orders.push(order);
        }
        Ok(orders)
    }

    async fn attach_transaction(
        &self,
        order_id: Uuid,
        transaction_ref: &str,
    ) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            UPDATE orders
            SET transaction_ref = $2, payment_status = 'pending', updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(order_id)
        .bind(transaction_ref)
        .execute(&self.db.pool)
        .await?;
        Ok(())
    }

    async fn settle_payment(
        &self,
        order_id: Uuid,
        status: PaymentStatus,
    ) -> Result<bool, RepoError> {
        // Conditional UPDATE; only a pending payment settles, same shape as
        // the stock decrement guard.
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET payment_status = $2, updated_at = NOW()
            WHERE id = $1 AND payment_status = 'pending'
            "#,
        )
        .bind(order_id)
        .bind(status.as_str())
        .execute(&self.db.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn update_order_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<(), RepoError> {
        sqlx::query("UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(order_id)
            .bind(status.as_str())
            .execute(&self.db.pool)
            .await?;
        Ok(())
    }
}
