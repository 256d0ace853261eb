use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;
use zeva_catalog::{Category, Product};

use crate::products::ProductResponse;
use crate::{error::AppError, state::AppState};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub retail_price_paisa: i64,
    pub offer_price_paisa: Option<i64>,
    pub stock: i32,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Partial update; absent fields keep their current value. The offer price
/// is a nested Option so `"offer_price_paisa": null` clears the discount.
#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub retail_price_paisa: Option<i64>,
    #[serde(default)]
    pub offer_price_paisa: Option<Option<i64>>,
    pub stock: Option<i32>,
    pub images: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCollectionRequest {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCollectionRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub image: Option<String>,
}

// ============================================================================
// Router
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/products", post(create_product))
        .route("/admin/products/{id}", put(update_product))
        .route("/admin/products/{id}", delete(delete_product))
        .route("/admin/products/{id}/restock", post(restock_product))
        .route("/admin/orders", get(list_orders))
        .route("/admin/orders/{id}/status", put(update_order_status))
        .route("/admin/collections", post(create_collection))
        .route("/admin/collections/{id}", put(update_collection))
        .route("/admin/collections/{id}", delete(delete_collection))
}

// ============================================================================
// Product Handlers
// ============================================================================

async fn create_product(
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    if req.retail_price_paisa <= 0 {
        return Err(AppError::ValidationError("Price must be positive".into()));
    }
    if req.stock < 0 {
        return Err(AppError::ValidationError("Stock cannot be negative".into()));
    }

    let mut product = Product::new(req.name, req.retail_price_paisa, req.stock);
    product.description = req.description;
    product.category_id = req.category_id;
    product.offer_price_paisa = req.offer_price_paisa;
    product.images = req.images;

    state
        .products
        .create_product(&product)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    tracing::info!(product_id = %product.id, "product created");
    Ok(Json(product.into()))
}

async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    let mut product = state
        .products
        .get_product(id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError(format!("Product {} not found", id)))?;

    if let Some(name) = req.name {
        product.name = name;
    }
    if let Some(description) = req.description {
        product.description = Some(description);
    }
    if let Some(category_id) = req.category_id {
        product.category_id = Some(category_id);
    }
    if let Some(price) = req.retail_price_paisa {
        if price <= 0 {
            return Err(AppError::ValidationError("Price must be positive".into()));
        }
        product.retail_price_paisa = price;
    }
    if let Some(offer) = req.offer_price_paisa {
        product.offer_price_paisa = offer;
    }
    if let Some(stock) = req.stock {
        if stock < 0 {
            return Err(AppError::ValidationError("Stock cannot be negative".into()));
        }
        product.stock = stock;
    }
    if let Some(images) = req.images {
        product.images = images;
    }
    if let Some(is_active) = req.is_active {
        product.is_active = is_active;
    }

    state
        .products
        .update_product(&product)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(product.into()))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    state
        .products
        .get_product(id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError(format!("Product {} not found", id)))?;

    state
        .products
        .delete_product(id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    tracing::info!(product_id = %id, "product retired");
    Ok(Json(json!({ "deleted": id })))
}

async fn restock_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<RestockRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    if req.quantity <= 0 {
        return Err(AppError::ValidationError(
            "Restock quantity must be positive".into(),
        ));
    }

    state
        .products
        .get_product(id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError(format!("Product {} not found", id)))?;

    state
        .products
        .increment_stock(id, req.quantity)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let product = state
        .products
        .get_product(id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError(format!("Product {} not found", id)))?;

    tracing::info!(product_id = %id, quantity = req.quantity, "product restocked");
    Ok(Json(product.into()))
}

// ============================================================================
// Order Handlers
// ============================================================================

async fn list_orders(
    State(state): State<AppState>,
) -> Result<Json<Vec<crate::orders::OrderResponse>>, AppError> {
    let orders = state
        .orders
        .list_orders()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateOrderStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let status = zeva_order::models::OrderStatus::parse(&req.status)
        .ok_or_else(|| AppError::ValidationError(format!("Unknown order status '{}'", req.status)))?;

    state
        .orders
        .get_order(id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError(format!("Order {} not found", id)))?;

    state
        .orders
        .update_order_status(id, status)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    tracing::info!(order_id = %id, status = status.as_str(), "order status updated");
    Ok(Json(json!({ "id": id, "status": status.as_str() })))
}

// ============================================================================
// Collection Handlers
// ============================================================================

async fn create_collection(
    State(state): State<AppState>,
    Json(req): Json<CreateCollectionRequest>,
) -> Result<Json<Category>, AppError> {
    if state
        .categories
        .find_category_by_name(&req.name)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .is_some()
    {
        return Err(AppError::ConflictError(format!(
            "Collection '{}' already exists",
            req.name
        )));
    }

    let mut category = Category::new(req.name);
    category.description = req.description;
    category.icon = req.icon;
    category.image = req.image;

    state
        .categories
        .create_category(&category)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    tracing::info!(collection_id = %category.id, "collection created");
    Ok(Json(category))
}

async fn update_collection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCollectionRequest>,
) -> Result<Json<Category>, AppError> {
    let mut category = state
        .categories
        .get_category(id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError(format!("Collection {} not found", id)))?;

    if let Some(name) = req.name {
        if name != category.name {
            let taken = state
                .categories
                .find_category_by_name(&name)
                .await
                .map_err(|e| AppError::InternalServerError(e.to_string()))?;
            if taken.is_some() {
                return Err(AppError::ConflictError(format!(
                    "Collection '{}' already exists",
                    name
                )));
            }
        }
        category.name = name;
    }
    if let Some(description) = req.description {
        category.description = Some(description);
    }
    if let Some(icon) = req.icon {
        category.icon = Some(icon);
    }
    if let Some(image) = req.image {
        category.image = Some(image);
    }

    state
        .categories
        .update_category(&category)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(category))
}

async fn delete_collection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    state
        .categories
        .get_category(id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError(format!("Collection {} not found", id)))?;

    state
        .categories
        .delete_category(id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    tracing::info!(collection_id = %id, "collection retired");
    Ok(Json(json!({ "deleted": id })))
}
