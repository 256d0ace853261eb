use std::sync::Arc;

use uuid::Uuid;
use zeva_catalog::repository::ProductRepository;
use zeva_catalog::Product;

use crate::models::{CustomerInfo, Order, OrderItem};
use crate::number;
use crate::repository::OrderRepository;

/// A requested product line, as it arrives from the checkout form.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Product {0} not found")]
    ProductNotFound(Uuid),

    #[error("Insufficient stock for {name}: requested {requested}, available {available}")]
    InsufficientStock {
        name: String,
        requested: i32,
        available: i32,
    },

    #[error("Invalid order: {0}")]
    Invalid(String),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Places orders: prices each line against the live catalog, reserves stock
/// all-or-nothing, and persists the order with per-line prices frozen at
/// purchase time.
pub struct OrderLedger {
    products: Arc<dyn ProductRepository>,
    orders: Arc<dyn OrderRepository>,
}

impl OrderLedger {
    pub fn new(products: Arc<dyn ProductRepository>, orders: Arc<dyn OrderRepository>) -> Self {
        Self { products, orders }
    }

    /// Create an order for the given lines. Either every line is priced,
    /// every stock decrement lands and the whole order is persisted, or
    /// nothing changes: any failure after the first decrement releases the
    /// reservations taken so far.
    pub async fn place_order(
        &self,
        customer: CustomerInfo,
        payment_method: &str,
        lines: &[OrderLine],
        user_id: Option<Uuid>,
    ) -> Result<Order, OrderError> {
        if lines.is_empty() {
            return Err(OrderError::Invalid("order has no items".into()));
        }

        // Phase 1: resolve each product and freeze its effective price.
        let mut priced: Vec<(Product, i32)> = Vec::with_capacity(lines.len());
        for line in lines {
            if line.quantity <= 0 {
                return Err(OrderError::Invalid(format!(
                    "quantity must be positive, got {}",
                    line.quantity
                )));
            }
            let product = self
                .products
                .get_product(line.product_id)
                .await
                .map_err(|e| OrderError::Storage(e.to_string()))?
                .filter(|p| p.is_active)
                .ok_or(OrderError::ProductNotFound(line.product_id))?;

            if product.stock < line.quantity {
                return Err(OrderError::InsufficientStock {
                    name: product.name,
                    requested: line.quantity,
                    available: product.stock,
                });
            }
            priced.push((product, line.quantity));
        }

        // Phase 2: reserve stock. The conditional decrement re-checks
        // availability atomically, so a concurrent order cannot double-sell
        // the last unit past the phase-1 snapshot.
        let mut reserved: Vec<(Uuid, i32)> = Vec::with_capacity(priced.len());
        for (product, qty) in &priced {
            match self.products.decrement_stock(product.id, *qty).await {
                Ok(true) => reserved.push((product.id, *qty)),
                Ok(false) => {
                    self.release(&reserved).await;
                    let available = self.current_stock(product.id).await.unwrap_or(product.stock);
                    return Err(OrderError::InsufficientStock {
                        name: product.name.clone(),
                        requested: *qty,
                        available,
                    });
                }
                Err(e) => {
                    self.release(&reserved).await;
                    return Err(OrderError::Storage(e.to_string()));
                }
            }
        }

        // Phase 3: persist header and items as one unit.
        let mut order = Order::new(number::generate(), user_id, customer, payment_method);
        for (product, qty) in &priced {
            order.add_item(OrderItem::new(
                order.id,
                product.id,
                product.name.clone(),
                *qty,
                product.effective_price_paisa(),
            ));
        }

        if let Err(e) = self.orders.create_order(&order).await {
            self.release(&reserved).await;
            return Err(OrderError::Storage(e.to_string()));
        }

        tracing::info!(
            order_number = %order.order_number,
            total_paisa = order.total_amount_paisa,
            lines = order.items.len(),
            "order placed"
        );
        Ok(order)
    }

    /// Hand reserved units back after a failed placement.
    async fn release(&self, reserved: &[(Uuid, i32)]) {
        for (product_id, qty) in reserved {
            if let Err(e) = self.products.increment_stock(*product_id, *qty).await {
                tracing::error!(%product_id, qty, "failed to release reserved stock: {e}");
            }
        }
    }

    async fn current_stock(&self, product_id: Uuid) -> Option<i32> {
        self.products
            .get_product(product_id)
            .await
            .ok()
            .flatten()
            .map(|p| p.stock)
    }
}
