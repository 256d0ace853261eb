use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A catalog entry. `stock` is the single canonical availability counter;
/// the old `stock_quantity` column name survives only as a response alias
/// at the API layer. Prices are integer paisa.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub retail_price_paisa: i64,
    /// Discounted price overriding the retail price while set.
    pub offer_price_paisa: Option<i64>,
    pub stock: i32,
    pub images: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(name: impl Into<String>, retail_price_paisa: i64, stock: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            category_id: None,
            retail_price_paisa,
            offer_price_paisa: None,
            stock,
            images: Vec::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// The price a buyer pays right now: offer price when present,
    /// retail price otherwise.
    pub fn effective_price_paisa(&self) -> i64 {
        self.offer_price_paisa.unwrap_or(self.retail_price_paisa)
    }
}
