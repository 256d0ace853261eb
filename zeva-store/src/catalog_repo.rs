use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;
use zeva_catalog::offer::UNDER_299_CEILING_PAISA;
use zeva_catalog::repository::{CategoryRepository, OfferRepository, ProductRepository};
use zeva_catalog::{Category, Offer, OfferType, Product};

use crate::database::DbClient;

type RepoError = Box<dyn std::error::Error + Send + Sync>;

/// Catalog tables behind the repository traits. Stock movement is a single
/// conditional UPDATE so two checkouts can never both take the last unit.
#[derive(Clone)]
pub struct PgCatalogRepository {
    db: DbClient,
}

impl PgCatalogRepository {
    pub fn new(db: DbClient) -> Self {
        Self { db }
    }
}

fn product_from_row(row: &PgRow) -> Result<Product, sqlx::Error> {
    let images: serde_json::Value = row.try_get("images")?;
    let images = serde_json::from_value(images).unwrap_or_default();
    Ok(Product {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        category_id: row.try_get("category_id")?,
        retail_price_paisa: row.try_get("retail_price_paisa")?,
        offer_price_paisa: row.try_get("offer_price_paisa")?,
        stock: row.try_get("stock")?,
        images,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn offer_from_row(row: &PgRow) -> Result<Offer, RepoError> {
    let offer_type: String = row.try_get("offer_type")?;
    Ok(Offer {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        offer_type: OfferType::parse(&offer_type)
            .ok_or_else(|| format!("unknown offer type {offer_type:?}"))?,
        discount_percent: row.try_get("discount_percent")?,
        discount_amount_paisa: row.try_get("discount_amount_paisa")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
    })
}

fn category_from_row(row: &PgRow) -> Result<Category, sqlx::Error> {
    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        icon: row.try_get("icon")?,
        image: row.try_get("image")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl ProductRepository for PgCatalogRepository {
    async fn create_product(&self, product: &Product) -> Result<Uuid, RepoError> {
        sqlx::query(
            r#"
            INSERT INTO products
                (id, name, description, category_id, retail_price_paisa,
                 offer_price_paisa, stock, images, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.category_id)
        .bind(product.retail_price_paisa)
        .bind(product.offer_price_paisa)
        .bind(product.stock)
        .bind(serde_json::to_value(&product.images)?)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.db.pool)
        .await?;
        Ok(product.id)
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, RepoError> {
        let row = sqlx::query("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db.pool)
            .await?;
        Ok(row.as_ref().map(product_from_row).transpose()?)
    }

    async fn list_products(
        &self,
        category_id: Option<Uuid>,
        include_inactive: bool,
    ) -> Result<Vec<Product>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM products
            WHERE ($1 OR is_active)
              AND ($2::uuid IS NULL OR category_id = $2)
            ORDER BY created_at
            "#,
        )
        .bind(include_inactive)
        .bind(category_id)
        .fetch_all(&self.db.pool)
        .await?;
        Ok(rows
            .iter()
            .map(product_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn update_product(&self, product: &Product) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            UPDATE products SET
                name = $2, description = $3, category_id = $4,
                retail_price_paisa = $5, offer_price_paisa = $6, stock = $7,
                images = $8, is_active = $9, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.category_id)
        .bind(product.retail_price_paisa)
        .bind(product.offer_price_paisa)
        .bind(product.stock)
        .bind(serde_json::to_value(&product.images)?)
        .bind(product.is_active)
        .execute(&self.db.pool)
        .await?;
        Ok(())
    }

    async fn delete_product(&self, id: Uuid) -> Result<(), RepoError> {
        sqlx::query("UPDATE products SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.db.pool)
            .await?;
        Ok(())
    }

    async fn decrement_stock(&self, id: Uuid, qty: i32) -> Result<bool, RepoError> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock - $2, updated_at = NOW()
            WHERE id = $1 AND stock >= $2
            "#,
        )
        .bind(id)
        .bind(qty)
        .execute(&self.db.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn increment_stock(&self, id: Uuid, qty: i32) -> Result<(), RepoError> {
        sqlx::query("UPDATE products SET stock = stock + $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(qty)
            .execute(&self.db.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for PgCatalogRepository {
    async fn create_category(&self, category: &Category) -> Result<Uuid, RepoError> {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name, description, icon, image, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(&category.icon)
        .bind(&category.image)
        .bind(category.is_active)
        .bind(category.created_at)
        .execute(&self.db.pool)
        .await?;
        Ok(category.id)
    }

    async fn get_category(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        let row = sqlx::query("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db.pool)
            .await?;
        Ok(row.as_ref().map(category_from_row).transpose()?)
    }

    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>, RepoError> {
        let row = sqlx::query("SELECT * FROM categories WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.db.pool)
            .await?;
        Ok(row.as_ref().map(category_from_row).transpose()?)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, RepoError> {
        let rows = sqlx::query("SELECT * FROM categories WHERE is_active ORDER BY name")
            .fetch_all(&self.db.pool)
            .await?;
        Ok(rows
            .iter()
            .map(category_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn update_category(&self, category: &Category) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            UPDATE categories SET
                name = $2, description = $3, icon = $4, image = $5, is_active = $6
            WHERE id = $1
            "#,
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(&category.icon)
        .bind(&category.image)
        .bind(category.is_active)
        .execute(&self.db.pool)
        .await?;
        Ok(())
    }

    async fn delete_category(&self, id: Uuid) -> Result<(), RepoError> {
        sqlx::query("UPDATE categories SET is_active = FALSE WHERE id = $1")
            .bind(id)
            .execute(&self.db.pool)
            .await?;
        Ok(())
    }

    async fn count_products(&self, category_id: Uuid) -> Result<i64, RepoError> {
        let row =
            sqlx::query("SELECT COUNT(*) AS n FROM products WHERE category_id = $1 AND is_active")
                .bind(category_id)
                .fetch_one(&self.db.pool)
                .await?;
        Ok(row.try_get("n")?)
    }
}

#[async_trait]
impl OfferRepository for PgCatalogRepository {
    async fn create_offer(&self, offer: &Offer) -> Result<Uuid, RepoError> {
        sqlx::query(
            r#"
            INSERT INTO offers
                (id, name, description, offer_type, discount_percent,
                 discount_amount_paisa, start_date, end_date, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(offer.id)
        .bind(&offer.name)
        .bind(&offer.description)
        .bind(offer.offer_type.as_str())
        .bind(offer.discount_percent)
        .bind(offer.discount_amount_paisa)
        .bind(offer.start_date)
        .bind(offer.end_date)
        .bind(offer.is_active)
        .bind(offer.created_at)
        .execute(&self.db.pool)
        .await?;
        Ok(offer.id)
    }

    async fn get_offer(&self, id: Uuid) -> Result<Option<Offer>, RepoError> {
        let row = sqlx::query("SELECT * FROM offers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db.pool)
            .await?;
        row.as_ref().map(offer_from_row).transpose()
    }

    async fn list_offers(&self) -> Result<Vec<Offer>, RepoError> {
        let rows = sqlx::query("SELECT * FROM offers ORDER BY created_at DESC")
            .fetch_all(&self.db.pool)
            .await?;
        rows.iter().map(offer_from_row).collect()
    }

    async fn update_offer(&self, offer: &Offer) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            UPDATE offers SET
                name = $2, description = $3, offer_type = $4, discount_percent = $5,
                discount_amount_paisa = $6, start_date = $7, end_date = $8, is_active = $9
            WHERE id = $1
            "#,
        )
        .bind(offer.id)
        .bind(&offer.name)
        .bind(&offer.description)
        .bind(offer.offer_type.as_str())
        .bind(offer.discount_percent)
        .bind(offer.discount_amount_paisa)
        .bind(offer.start_date)
        .bind(offer.end_date)
        .bind(offer.is_active)
        .execute(&self.db.pool)
        .await?;
        Ok(())
    }

    async fn delete_offer(&self, id: Uuid) -> Result<(), RepoError> {
        sqlx::query("UPDATE offers SET is_active = FALSE WHERE id = $1")
            .bind(id)
            .execute(&self.db.pool)
            .await?;
        Ok(())
    }

    async fn link_product(&self, offer_id: Uuid, product_id: Uuid) -> Result<bool, RepoError> {
        // ON CONFLICT DO NOTHING: an existing link reads as zero rows.
        let result = sqlx::query(
            r#"
            INSERT INTO product_offers (offer_id, product_id)
            VALUES ($1, $2)
            ON CONFLICT (offer_id, product_id) DO NOTHING
            "#,
        )
        .bind(offer_id)
        .bind(product_id)
        .execute(&self.db.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn unlink_product(&self, offer_id: Uuid, product_id: Uuid) -> Result<bool, RepoError> {
        let result =
            sqlx::query("DELETE FROM product_offers WHERE offer_id = $1 AND product_id = $2")
                .bind(offer_id)
                .bind(product_id)
                .execute(&self.db.pool)
                .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn products_for_offer_type(
        &self,
        offer_type: OfferType,
        now: DateTime<Utc>,
    ) -> Result<Vec<Product>, RepoError> {
        let rows = if offer_type == OfferType::Under299 {
            sqlx::query(
                r#"
                SELECT * FROM products
                WHERE is_active
                  AND COALESCE(offer_price_paisa, retail_price_paisa) <= $1
                ORDER BY created_at
                "#,
            )
            .bind(UNDER_299_CEILING_PAISA)
            .fetch_all(&self.db.pool)
            .await?
        } else {
            sqlx::query(
                r#"
                SELECT DISTINCT p.* FROM products p
                JOIN product_offers po ON po.product_id = p.id
                JOIN offers o ON o.id = po.offer_id
                WHERE p.is_active
                  AND o.is_active
                  AND o.offer_type = $1
                  AND o.start_date <= $2
                  AND o.end_date >= $2
                ORDER BY p.created_at
                "#,
            )
            .bind(offer_type.as_str())
            .bind(now)
            .fetch_all(&self.db.pool)
            .await?
        };
        Ok(rows
            .iter()
            .map(product_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }
}
