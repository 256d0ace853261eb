use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;
use zeva_catalog::{Offer, OfferType};

use crate::products::ProductResponse;
use crate::{error::AppError, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateOfferRequest {
    pub name: String,
    pub description: Option<String>,
    pub offer_type: String,
    pub discount_percent: Option<i32>,
    pub discount_amount_paisa: Option<i64>,
    pub start_date: chrono::DateTime<chrono::Utc>,
    pub end_date: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOfferRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub discount_percent: Option<i32>,
    pub discount_amount_paisa: Option<i64>,
    pub start_date: Option<chrono::DateTime<chrono::Utc>>,
    pub end_date: Option<chrono::DateTime<chrono::Utc>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct OfferResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub offer_type: String,
    pub discount_percent: Option<i32>,
    pub discount_amount_paisa: Option<i64>,
    pub start_date: chrono::DateTime<chrono::Utc>,
    pub end_date: chrono::DateTime<chrono::Utc>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Offer> for OfferResponse {
    fn from(offer: Offer) -> Self {
        Self {
            id: offer.id,
            name: offer.name,
            description: offer.description,
            offer_type: offer.offer_type.as_str().to_string(),
            discount_percent: offer.discount_percent,
            discount_amount_paisa: offer.discount_amount_paisa,
            start_date: offer.start_date,
            end_date: offer.end_date,
            is_active: offer.is_active,
            created_at: offer.created_at,
        }
    }
}

// ============================================================================
// Routers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new().route("/offers/{offer_type}", get(list_offer_products))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/offers", get(list_offers))
        .route("/admin/offers", post(create_offer))
        .route("/admin/offers/{id}", put(update_offer))
        .route("/admin/offers/{id}", delete(delete_offer))
        .route(
            "/admin/offers/{id}/products/{product_id}",
            post(link_product),
        )
        .route(
            "/admin/offers/{id}/products/{product_id}",
            delete(unlink_product),
        )
}

// ============================================================================
// Public Handlers
// ============================================================================

/// Storefront listing for one promotion surface. `under_299` derives from
/// prices alone; the other types show products linked to a live offer.
async fn list_offer_products(
    State(state): State<AppState>,
    Path(offer_type): Path<String>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let offer_type = OfferType::parse(&offer_type)
        .ok_or_else(|| AppError::ValidationError(format!("Unknown offer type '{}'", offer_type)))?;

    let products = state
        .offers
        .products_for_offer_type(offer_type, Utc::now())
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(products.into_iter().map(Into::into).collect()))
}

// ============================================================================
// Admin Handlers
// ============================================================================

async fn list_offers(
    State(state): State<AppState>,
) -> Result<Json<Vec<OfferResponse>>, AppError> {
    let offers = state
        .offers
        .list_offers()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(offers.into_iter().map(Into::into).collect()))
}

async fn create_offer(
    State(state): State<AppState>,
    Json(req): Json<CreateOfferRequest>,
) -> Result<Json<OfferResponse>, AppError> {
    let offer_type = OfferType::parse(&req.offer_type).ok_or_else(|| {
        AppError::ValidationError(format!("Unknown offer type '{}'", req.offer_type))
    })?;
    if req.end_date <= req.start_date {
        return Err(AppError::ValidationError(
            "Offer must end after it starts".into(),
        ));
    }

    let mut offer = Offer::new(req.name, offer_type, req.start_date, req.end_date);
    offer.description = req.description;
    offer.discount_percent = req.discount_percent;
    offer.discount_amount_paisa = req.discount_amount_paisa;

    state
        .offers
        .create_offer(&offer)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    tracing::info!(offer_id = %offer.id, offer_type = offer.offer_type.as_str(), "offer created");
    Ok(Json(offer.into()))
}

async fn update_offer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateOfferRequest>,
) -> Result<Json<OfferResponse>, AppError> {
    let mut offer = state
        .offers
        .get_offer(id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError(format!("Offer {} not found", id)))?;

    if let Some(name) = req.name {
        offer.name = name;
    }
    if let Some(description) = req.description {
        offer.description = Some(description);
    }
    if let Some(percent) = req.discount_percent {
        offer.discount_percent = Some(percent);
    }
    if let Some(amount) = req.discount_amount_paisa {
        offer.discount_amount_paisa = Some(amount);
    }
    if let Some(start_date) = req.start_date {
        offer.start_date = start_date;
    }
    if let Some(end_date) = req.end_date {
        offer.end_date = end_date;
    }
    if let Some(is_active) = req.is_active {
        offer.is_active = is_active;
    }
    if offer.end_date <= offer.start_date {
        return Err(AppError::ValidationError(
            "Offer must end after it starts".into(),
        ));
    }

    state
        .offers
        .update_offer(&offer)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(offer.into()))
}

async fn delete_offer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    state
        .offers
        .get_offer(id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError(format!("Offer {} not found", id)))?;

    state
        .offers
        .delete_offer(id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    tracing::info!(offer_id = %id, "offer retired");
    Ok(Json(json!({ "deleted": id })))
}

async fn link_product(
    State(state): State<AppState>,
    Path((id, product_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, AppError> {
    state
        .offers
        .get_offer(id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError(format!("Offer {} not found", id)))?;
    state
        .products
        .get_product(product_id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError(format!("Product {} not found", product_id)))?;

    let linked = state
        .offers
        .link_product(id, product_id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    if !linked {
        return Err(AppError::ValidationError(
            "Product is already linked to this offer".into(),
        ));
    }

    tracing::info!(offer_id = %id, product_id = %product_id, "product linked to offer");
    Ok(Json(json!({ "offer_id": id, "product_id": product_id })))
}

async fn unlink_product(
    State(state): State<AppState>,
    Path((id, product_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, AppError> {
    let unlinked = state
        .offers
        .unlink_product(id, product_id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    if !unlinked {
        return Err(AppError::NotFoundError(
            "Product is not linked to this offer".into(),
        ));
    }

    tracing::info!(offer_id = %id, product_id = %product_id, "product unlinked from offer");
    Ok(Json(json!({ "unlinked": product_id })))
}
