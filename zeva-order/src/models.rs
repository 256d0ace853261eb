use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fulfillment lifecycle of an order. Moves forward through
/// pending -> processing -> shipped -> delivered, or sideways to cancelled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "processing" => Some(OrderStatus::Processing),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

/// Payment state mirrored from the gateway. `Pending` is provisional; only
/// a gateway callback moves an order into a terminal state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
}

impl PaymentStatus {
    /// Whether a transition out of `pending` has already happened.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Success => "success",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "success" => Some(PaymentStatus::Success),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

/// Contact and shipping details copied onto the order at placement time.
/// Immutable afterwards, even if the customer edits their profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerInfo {
    #[serde(rename = "customer_name")]
    pub name: String,
    #[serde(rename = "customer_email")]
    pub email: String,
    #[serde(rename = "customer_phone")]
    pub phone: String,
    pub shipping_address: String,
}

/// The single source of truth for a purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    /// None for guest checkouts.
    pub user_id: Option<Uuid>,
    #[serde(flatten)]
    pub customer: CustomerInfo,
    pub total_amount_paisa: i64,
    pub status: OrderStatus,
    pub payment_method: String,
    pub payment_status: PaymentStatus,
    /// Reference of the most recent payment attempt, set after the gateway
    /// accepts a submission.
    pub transaction_ref: Option<String>,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        order_number: String,
        user_id: Option<Uuid>,
        customer: CustomerInfo,
        payment_method: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            order_number,
            user_id,
            customer,
            total_amount_paisa: 0,
            status: OrderStatus::Pending,
            payment_method: payment_method.into(),
            payment_status: PaymentStatus::Pending,
            transaction_ref: None,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a line and fold it into the total.
    pub fn add_item(&mut self, item: OrderItem) {
        self.total_amount_paisa += item.line_total_paisa();
        self.items.push(item);
        self.updated_at = Utc::now();
    }
}

/// One product line of an order. `unit_price_paisa` is the effective price
/// at the moment of purchase and is never recomputed from catalog data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price_paisa: i64,
}

impl OrderItem {
    pub fn new(
        order_id: Uuid,
        product_id: Uuid,
        product_name: impl Into<String>,
        quantity: i32,
        unit_price_paisa: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            product_id,
            product_name: product_name.into(),
            quantity,
            unit_price_paisa,
        }
    }

    pub fn line_total_paisa(&self) -> i64 {
        self.unit_price_paisa * i64::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_tracks_added_items() {
        let customer = CustomerInfo {
            name: "Amna".into(),
            email: "amna@example.com".into(),
            phone: "03001234567".into(),
            shipping_address: "House 4, Lahore".into(),
        };
        let mut order = Order::new("ZV-20250101-ABCDEF01".into(), None, customer, "jazzcash");

        order.add_item(OrderItem::new(order.id, Uuid::new_v4(), "Ring", 2, 45000));
        order.add_item(OrderItem::new(order.id, Uuid::new_v4(), "Chain", 1, 120000));

        assert_eq!(order.total_amount_paisa, 2 * 45000 + 120000);
        let sum: i64 = order.items.iter().map(|i| i.line_total_paisa()).sum();
        assert_eq!(order.total_amount_paisa, sum);
    }

    #[test]
    fn payment_status_terminality() {
        assert!(!PaymentStatus::Pending.is_terminal());
        assert!(PaymentStatus::Success.is_terminal());
        assert!(PaymentStatus::Failed.is_terminal());
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("returned"), None);
    }
}
