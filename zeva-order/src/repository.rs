use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Order, OrderStatus, PaymentStatus};

/// Repository trait for order data access
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist the order header and every item as one unit. Implementations
    /// backed by a database must wrap this in a single transaction.
    async fn create_order(
        &self,
        order: &Order,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn get_order(
        &self,
        id: Uuid,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_order_by_number(
        &self,
        order_number: &str,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_order_by_transaction(
        &self,
        transaction_ref: &str,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_orders_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>>;

    /// Every order, newest first. Admin dashboard view.
    async fn list_orders(&self) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>>;

    /// Record an accepted gateway submission: store the transaction
    /// reference and reset the payment status to `pending`.
    async fn attach_transaction(
        &self,
        order_id: Uuid,
        transaction_ref: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Move the payment out of `pending` into a terminal status. Returns
    /// `false` without touching the order when it has already settled; the
    /// check and the write are one atomic step, so concurrent callbacks for
    /// the same transaction race to a single winner.
    async fn settle_payment(
        &self,
        order_id: Uuid,
        status: PaymentStatus,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    async fn update_order_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
