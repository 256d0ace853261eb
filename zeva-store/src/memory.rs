//! In-process store backing tests and `memory:` deployments. One struct
//! implements every repository trait; handlers hold it behind trait objects
//! exactly as they hold the Postgres repositories.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;
use zeva_catalog::offer::UNDER_299_CEILING_PAISA;
use zeva_catalog::repository::{CategoryRepository, OfferRepository, ProductRepository};
use zeva_catalog::{Category, Offer, OfferType, Product};
use zeva_order::models::{Order, OrderStatus, PaymentStatus};
use zeva_order::repository::OrderRepository;

#[derive(Default)]
pub struct MemoryStore {
    products: RwLock<HashMap<Uuid, Product>>,
    categories: RwLock<HashMap<Uuid, Category>>,
    orders: RwLock<HashMap<Uuid, Order>>,
    offers: RwLock<HashMap<Uuid, Offer>>,
    offer_links: RwLock<HashSet<(Uuid, Uuid)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn create_product(
        &self,
        product: &Product,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
        self.products
            .write()
            .await
            .insert(product.id, product.clone());
        Ok(product.id)
    }

    async fn get_product(
        &self,
        id: Uuid,
    ) -> Result<Option<Product>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn list_products(
        &self,
        category_id: Option<Uuid>,
        include_inactive: bool,
    ) -> Result<Vec<Product>, Box<dyn std::error::Error + Send + Sync>> {
        let products = self.products.read().await;
        let mut listed: Vec<Product> = products
            .values()
            .filter(|p| include_inactive || p.is_active)
            .filter(|p| category_id.is_none() || p.category_id == category_id)
            .cloned()
            .collect();
        listed.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(listed)
    }

    async fn update_product(
        &self,
        product: &Product,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.products
            .write()
            .await
            .insert(product.id, product.clone());
        Ok(())
    }

    async fn delete_product(
        &self,
        id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Some(product) = self.products.write().await.get_mut(&id) {
            product.is_active = false;
        }
        Ok(())
    }

    async fn decrement_stock(
        &self,
        id: Uuid,
        qty: i32,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        // Check and decrement under one write guard; the counterpart of the
        // conditional UPDATE in the Postgres repository.
        let mut products = self.products.write().await;
        let product = products
            .get_mut(&id)
            .ok_or_else(|| format!("product {id} not found"))?;
        if product.stock < qty {
            return Ok(false);
        }
        product.stock -= qty;
        product.updated_at = chrono::Utc::now();
        Ok(true)
    }

    async fn increment_stock(
        &self,
        id: Uuid,
        qty: i32,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut products = self.products.write().await;
        let product = products
            .get_mut(&id)
            .ok_or_else(|| format!("product {id} not found"))?;
        product.stock += qty;
        product.updated_at = chrono::Utc::now();
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn create_category(
        &self,
        category: &Category,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
        self.categories
            .write()
            .await
            .insert(category.id, category.clone());
        Ok(category.id)
    }

    async fn get_category(
        &self,
        id: Uuid,
    ) -> Result<Option<Category>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.categories.read().await.get(&id).cloned())
    }

    async fn find_category_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Category>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .categories
            .read()
            .await
            .values()
            .find(|c| c.name == name)
            .cloned())
    }

    async fn list_categories(
        &self,
    ) -> Result<Vec<Category>, Box<dyn std::error::Error + Send + Sync>> {
        let categories = self.categories.read().await;
        let mut listed: Vec<Category> = categories
            .values()
            .filter(|c| c.is_active)
            .cloned()
            .collect();
        listed.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listed)
    }

    async fn update_category(
        &self,
        category: &Category,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.categories
            .write()
            .await
            .insert(category.id, category.clone());
        Ok(())
    }

    async fn delete_category(
        &self,
        id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Some(category) = self.categories.write().await.get_mut(&id) {
            category.is_active = false;
        }
        Ok(())
    }

    async fn count_products(
        &self,
        category_id: Uuid,
    ) -> Result<i64, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .products
            .read()
            .await
            .values()
            .filter(|p| p.is_active && p.category_id == Some(category_id))
            .count() as i64)
    }
}

#[async_trait]
impl OfferRepository for MemoryStore {
    async fn create_offer(
        &self,
        offer: &Offer,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
        self.offers.write().await.insert(offer.id, offer.clone());
        Ok(offer.id)
    }

    async fn get_offer(
        &self,
        id: Uuid,
    ) -> Result<Option<Offer>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.offers.read().await.get(&id).cloned())
    }

    async fn list_offers(&self) -> Result<Vec<Offer>, Box<dyn std::error::Error + Send + Sync>> {
        let offers = self.offers.read().await;
        let mut listed: Vec<Offer> = offers.values().cloned().collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listed)
    }

    async fn update_offer(
        &self,
        offer: &Offer,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.offers.write().await.insert(offer.id, offer.clone());
        Ok(())
    }

    async fn delete_offer(
        &self,
        id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Some(offer) = self.offers.write().await.get_mut(&id) {
            offer.is_active = false;
        }
        Ok(())
    }

    async fn link_product(
        &self,
        offer_id: Uuid,
        product_id: Uuid,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.offer_links.write().await.insert((offer_id, product_id)))
    }

    async fn unlink_product(
        &self,
        offer_id: Uuid,
        product_id: Uuid,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.offer_links.write().await.remove(&(offer_id, product_id)))
    }

    async fn products_for_offer_type(
        &self,
        offer_type: OfferType,
        now: DateTime<Utc>,
    ) -> Result<Vec<Product>, Box<dyn std::error::Error + Send + Sync>> {
        let products = self.products.read().await;

        let mut listed: Vec<Product> = if offer_type == OfferType::Under299 {
            products
                .values()
                .filter(|p| p.is_active && p.effective_price_paisa() <= UNDER_299_CEILING_PAISA)
                .cloned()
                .collect()
        } else {
            let offers = self.offers.read().await;
            let links = self.offer_links.read().await;
            let live: HashSet<Uuid> = offers
                .values()
                .filter(|o| o.offer_type == offer_type && o.is_live(now))
                .map(|o| o.id)
                .collect();
            let linked: HashSet<Uuid> = links
                .iter()
                .filter(|(offer_id, _)| live.contains(offer_id))
                .map(|(_, product_id)| *product_id)
                .collect();
            products
                .values()
                .filter(|p| p.is_active && linked.contains(&p.id))
                .cloned()
                .collect()
        };

        listed.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(listed)
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn create_order(
        &self,
        order: &Order,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.orders.write().await.insert(order.id, order.clone());
        Ok(())
    }

    async fn get_order(
        &self,
        id: Uuid,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn get_order_by_number(
        &self,
        order_number: &str,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .orders
            .read()
            .await
            .values()
            .find(|o| o.order_number == order_number)
            .cloned())
    }

    async fn get_order_by_transaction(
        &self,
        transaction_ref: &str,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .orders
            .read()
            .await
            .values()
            .find(|o| o.transaction_ref.as_deref() == Some(transaction_ref))
            .cloned())
    }

    async fn list_orders_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let orders = self.orders.read().await;
        let mut listed: Vec<Order> = orders
            .values()
            .filter(|o| o.user_id == Some(user_id))
            .cloned()
            .collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listed)
    }

    async fn list_orders(&self) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let orders = self.orders.read().await;
        let mut listed: Vec<Order> = orders.values().cloned().collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listed)
    }

    async fn attach_transaction(
        &self,
        order_id: Uuid,
        transaction_ref: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(&order_id)
            .ok_or_else(|| format!("order {order_id} not found"))?;
        order.transaction_ref = Some(transaction_ref.to_string());
        order.payment_status = PaymentStatus::Pending;
        order.updated_at = chrono::Utc::now();
        Ok(())
    }

    async fn settle_payment(
        &self,
        order_id: Uuid,
        status: PaymentStatus,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        // Check and write under one guard; the counterpart of the
        // conditional UPDATE in the Postgres repository.
        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(&order_id)
            .ok_or_else(|| format!("order {order_id} not found"))?;
        if order.payment_status != PaymentStatus::Pending {
            return Ok(false);
        }
        order.payment_status = status;
        order.updated_at = chrono::Utc::now();
        Ok(true)
    }

    async fn update_order_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(&order_id)
            .ok_or_else(|| format!("order {order_id} not found"))?;
        order.status = status;
        order.updated_at = chrono::Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn conditional_decrement_guards_stock() {
        let store = MemoryStore::new();
        let product = Product::new("Silver Bangle", 25000, 2);
        let id = store.create_product(&product).await.unwrap();

        assert!(store.decrement_stock(id, 2).await.unwrap());
        assert!(!store.decrement_stock(id, 1).await.unwrap());
        assert_eq!(store.get_product(id).await.unwrap().unwrap().stock, 0);

        store.increment_stock(id, 3).await.unwrap();
        assert_eq!(store.get_product(id).await.unwrap().unwrap().stock, 3);
    }

    #[tokio::test]
    async fn concurrent_orders_never_oversell_the_last_unit() {
        let store = Arc::new(MemoryStore::new());
        let product = Product::new("One Of A Kind", 500000, 1);
        let id = store.create_product(&product).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(
                async move { store.decrement_stock(id, 1).await },
            ));
        }

        let mut wins = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap() {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
        assert_eq!(store.get_product(id).await.unwrap().unwrap().stock, 0);
    }

    #[tokio::test]
    async fn soft_deleted_products_drop_out_of_listings() {
        let store = MemoryStore::new();
        let keep = Product::new("Kept", 1000, 1);
        let gone = Product::new("Gone", 1000, 1);
        store.create_product(&keep).await.unwrap();
        store.create_product(&gone).await.unwrap();
        store.delete_product(gone.id).await.unwrap();

        let listed = store.list_products(None, false).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Kept");

        let all = store.list_products(None, true).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn category_product_counts_track_active_products() {
        let store = MemoryStore::new();
        let category = Category::new("Bridal");
        store.create_category(&category).await.unwrap();

        let mut in_cat = Product::new("Set", 900000, 1);
        in_cat.category_id = Some(category.id);
        let mut retired = Product::new("Old Set", 700000, 0);
        retired.category_id = Some(category.id);
        retired.is_active = false;
        store.create_product(&in_cat).await.unwrap();
        store.create_product(&retired).await.unwrap();
        store.create_product(&Product::new("Loose Stone", 1000, 5)).await.unwrap();

        assert_eq!(store.count_products(category.id).await.unwrap(), 1);
        assert!(store
            .find_category_by_name("Bridal")
            .await
            .unwrap()
            .is_some());
        assert!(store
            .find_category_by_name("Minimal")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn under_299_listing_is_price_derived() {
        let store = MemoryStore::new();
        let cheap = Product::new("Anklet", 25000, 5);
        let mut discounted = Product::new("Studs", 40000, 5);
        discounted.offer_price_paisa = Some(29900);
        let dear = Product::new("Choker", 80000, 5);
        store.create_product(&cheap).await.unwrap();
        store.create_product(&discounted).await.unwrap();
        store.create_product(&dear).await.unwrap();

        let listed = store
            .products_for_offer_type(OfferType::Under299, Utc::now())
            .await
            .unwrap();
        let names: Vec<&str> = listed.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Anklet", "Studs"]);
    }

    #[tokio::test]
    async fn linked_offer_types_need_a_live_offer() {
        let store = MemoryStore::new();
        let product = Product::new("Jhumka", 150000, 5);
        store.create_product(&product).await.unwrap();

        let now = Utc::now();
        let offer = Offer::new(
            "Deal of the Month",
            OfferType::DealOfMonth,
            now - chrono::Duration::days(1),
            now + chrono::Duration::days(29),
        );
        store.create_offer(&offer).await.unwrap();

        // Nothing surfaces until the product is linked.
        assert!(store
            .products_for_offer_type(OfferType::DealOfMonth, now)
            .await
            .unwrap()
            .is_empty());

        assert!(store.link_product(offer.id, product.id).await.unwrap());
        // A second link attempt reports the existing link.
        assert!(!store.link_product(offer.id, product.id).await.unwrap());

        let listed = store
            .products_for_offer_type(OfferType::DealOfMonth, now)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Jhumka");

        // The window closing takes the product off the listing.
        assert!(store
            .products_for_offer_type(OfferType::DealOfMonth, now + chrono::Duration::days(40))
            .await
            .unwrap()
            .is_empty());

        assert!(store.unlink_product(offer.id, product.id).await.unwrap());
        assert!(!store.unlink_product(offer.id, product.id).await.unwrap());
        assert!(store
            .products_for_offer_type(OfferType::DealOfMonth, now)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn deactivated_offers_stop_surfacing_products() {
        let store = MemoryStore::new();
        let product = Product::new("Tikka", 60000, 2);
        store.create_product(&product).await.unwrap();

        let now = Utc::now();
        let offer = Offer::new(
            "Eid Special",
            OfferType::SpecialDeals,
            now - chrono::Duration::days(1),
            now + chrono::Duration::days(7),
        );
        store.create_offer(&offer).await.unwrap();
        store.link_product(offer.id, product.id).await.unwrap();

        assert_eq!(
            store
                .products_for_offer_type(OfferType::SpecialDeals, now)
                .await
                .unwrap()
                .len(),
            1
        );

        store.delete_offer(offer.id).await.unwrap();
        assert!(store
            .products_for_offer_type(OfferType::SpecialDeals, now)
            .await
            .unwrap()
            .is_empty());
        // The row survives soft deletion for the admin list.
        assert!(store.get_offer(offer.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn payment_settles_exactly_once() {
        use zeva_order::models::CustomerInfo;

        let store = MemoryStore::new();
        let customer = CustomerInfo {
            name: "Mehak".into(),
            email: "mehak@example.com".into(),
            phone: "03001234567".into(),
            shipping_address: "DHA Phase 5, Lahore".into(),
        };
        let order = Order::new("ZV-20250101-MEM00001".into(), None, customer, "jazzcash");
        store.create_order(&order).await.unwrap();
        store.attach_transaction(order.id, "T1").await.unwrap();

        assert!(store
            .settle_payment(order.id, PaymentStatus::Success)
            .await
            .unwrap());
        assert!(!store
            .settle_payment(order.id, PaymentStatus::Failed)
            .await
            .unwrap());
        assert_eq!(
            store.get_order(order.id).await.unwrap().unwrap().payment_status,
            PaymentStatus::Success
        );
    }
}
