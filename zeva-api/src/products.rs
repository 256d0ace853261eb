use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeva_catalog::Product;
use zeva_core::money::format_rupees;

use crate::{error::AppError, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub category_id: Option<Uuid>,
}

/// Public product shape. `price` and `stock_quantity` are aliases kept for
/// clients written against the old schema.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub price: String,
    pub retail_price: String,
    pub offer_price: Option<String>,
    pub stock_quantity: i32,
    pub images: Vec<String>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            price: format_rupees(p.effective_price_paisa()),
            retail_price: format_rupees(p.retail_price_paisa),
            offer_price: p.offer_price_paisa.map(format_rupees),
            id: p.id,
            name: p.name,
            description: p.description,
            category_id: p.category_id,
            stock_quantity: p.stock,
            images: p.images,
            is_active: p.is_active,
            created_at: p.created_at,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/{id}", get(get_product))
}

async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let products = state
        .products
        .list_products(query.category_id, false)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(products.into_iter().map(Into::into).collect()))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductResponse>, AppError> {
    let product = state
        .products
        .get_product(id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .filter(|p| p.is_active)
        .ok_or_else(|| AppError::NotFoundError(format!("Product {} not found", id)))?;

    Ok(Json(product.into()))
}
