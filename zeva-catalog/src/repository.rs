use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::category::Category;
use crate::offer::{Offer, OfferType};
use crate::product::Product;

/// Repository trait for product catalog access
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create_product(
        &self,
        product: &Product,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_product(
        &self,
        id: Uuid,
    ) -> Result<Option<Product>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_products(
        &self,
        category_id: Option<Uuid>,
        include_inactive: bool,
    ) -> Result<Vec<Product>, Box<dyn std::error::Error + Send + Sync>>;

    async fn update_product(
        &self,
        product: &Product,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Soft delete: clears `is_active`, the row stays for order history.
    async fn delete_product(
        &self,
        id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Conditionally take `qty` units of stock. Returns `false` without
    /// mutating anything when fewer than `qty` units remain; the check and
    /// the decrement are one atomic step, so stock can never go negative
    /// under concurrent orders.
    async fn decrement_stock(
        &self,
        id: Uuid,
        qty: i32,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    /// Return `qty` units of stock. Used to release reservations when a
    /// later step of order placement fails, and for admin restocking.
    async fn increment_stock(
        &self,
        id: Uuid,
        qty: i32,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Repository trait for collection access
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create_category(
        &self,
        category: &Category,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_category(
        &self,
        id: Uuid,
    ) -> Result<Option<Category>, Box<dyn std::error::Error + Send + Sync>>;

    async fn find_category_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Category>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_categories(
        &self,
    ) -> Result<Vec<Category>, Box<dyn std::error::Error + Send + Sync>>;

    async fn update_category(
        &self,
        category: &Category,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn delete_category(
        &self,
        id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Active products currently filed under the collection.
    async fn count_products(
        &self,
        category_id: Uuid,
    ) -> Result<i64, Box<dyn std::error::Error + Send + Sync>>;
}

/// Repository trait for promotion access
#[async_trait]
pub trait OfferRepository: Send + Sync {
    async fn create_offer(
        &self,
        offer: &Offer,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_offer(
        &self,
        id: Uuid,
    ) -> Result<Option<Offer>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_offers(&self) -> Result<Vec<Offer>, Box<dyn std::error::Error + Send + Sync>>;

    async fn update_offer(
        &self,
        offer: &Offer,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Soft delete: clears `is_active`, existing links stay in place.
    async fn delete_offer(
        &self,
        id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Returns `false` when the product is already linked to the offer.
    async fn link_product(
        &self,
        offer_id: Uuid,
        product_id: Uuid,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    /// Returns `false` when no such link exists.
    async fn unlink_product(
        &self,
        offer_id: Uuid,
        product_id: Uuid,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    /// Active products surfaced by a promotion at `now`. `Under299` is
    /// price-derived (effective price at or below the ceiling); the linked
    /// types require a live offer of that type.
    async fn products_for_offer_type(
        &self,
        offer_type: OfferType,
        now: DateTime<Utc>,
    ) -> Result<Vec<Product>, Box<dyn std::error::Error + Send + Sync>>;
}
