use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;
use zeva_catalog::Category;

use crate::products::ProductResponse;
use crate::{error::AppError, state::AppState};

#[derive(Debug, Serialize)]
pub struct CollectionResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub image: Option<String>,
    pub product_count: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl CollectionResponse {
    fn from_category(category: Category, product_count: i64) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
            icon: category.icon,
            image: category.image,
            product_count,
            created_at: category.created_at,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/collections", get(list_collections))
        .route("/collections/{id}", get(get_collection))
        .route("/collections/{id}/products", get(collection_products))
}

async fn list_collections(
    State(state): State<AppState>,
) -> Result<Json<Vec<CollectionResponse>>, AppError> {
    let categories = state
        .categories
        .list_categories()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let mut collections = Vec::with_capacity(categories.len());
    for category in categories {
        let count = state
            .categories
            .count_products(category.id)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;
        collections.push(CollectionResponse::from_category(category, count));
    }

    Ok(Json(collections))
}

async fn get_collection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CollectionResponse>, AppError> {
    let category = state
        .categories
        .get_category(id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .filter(|c| c.is_active)
        .ok_or_else(|| AppError::NotFoundError(format!("Collection {} not found", id)))?;

    let count = state
        .categories
        .count_products(category.id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(CollectionResponse::from_category(category, count)))
}

async fn collection_products(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    state
        .categories
        .get_category(id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .filter(|c| c.is_active)
        .ok_or_else(|| AppError::NotFoundError(format!("Collection {} not found", id)))?;

    let products = state
        .products
        .list_products(Some(id), false)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(products.into_iter().map(Into::into).collect()))
}
