use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeva_core::money::format_rupees;
use zeva_order::ledger::OrderLine;
use zeva_order::models::{CustomerInfo, Order};

use crate::{error::AppError, middleware::auth::CustomerClaims, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    #[serde(flatten)]
    pub customer: CustomerInfo,
    pub payment_method: String,
    pub items: Vec<OrderLineRequest>,
}

#[derive(Debug, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    #[serde(flatten)]
    pub customer: CustomerInfo,
    pub status: String,
    pub payment_method: String,
    pub payment_status: String,
    pub transaction_ref: Option<String>,
    pub total_amount: String,
    pub total_amount_paisa: i64,
    pub items: Vec<OrderItemResponse>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: String,
    pub line_total: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number,
            customer: order.customer,
            status: order.status.as_str().to_string(),
            payment_method: order.payment_method,
            payment_status: order.payment_status.as_str().to_string(),
            transaction_ref: order.transaction_ref,
            total_amount: format_rupees(order.total_amount_paisa),
            total_amount_paisa: order.total_amount_paisa,
            items: order
                .items
                .into_iter()
                .map(|item| OrderItemResponse {
                    product_id: item.product_id,
                    product_name: item.product_name.clone(),
                    quantity: item.quantity,
                    unit_price: format_rupees(item.unit_price_paisa),
                    line_total: format_rupees(item.line_total_paisa()),
                })
                .collect(),
            created_at: order.created_at,
        }
    }
}

// ============================================================================
// Routers
// ============================================================================

/// Guest checkout needs no token.
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/orders/guest", post(place_guest_order))
}

/// Routes behind the customer auth middleware.
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(place_order))
        .route("/orders/my-orders", get(my_orders))
        .route("/orders/{id}", get(get_order))
}

// ============================================================================
// Handlers
// ============================================================================

async fn place_guest_order(
    State(state): State<AppState>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let lines = to_lines(&req.items);
    let order = state
        .ledger
        .place_order(req.customer, &req.payment_method, &lines, None)
        .await
        .map_err(AppError::from_order)?;

    tracing::info!(order_number = %order.order_number, "guest order placed");
    Ok(Json(order.into()))
}

async fn place_order(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let lines = to_lines(&req.items);
    let order = state
        .ledger
        .place_order(req.customer, &req.payment_method, &lines, user_id(&claims))
        .await
        .map_err(AppError::from_order)?;

    tracing::info!(order_number = %order.order_number, "order placed");
    Ok(Json(order.into()))
}

async fn my_orders(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
) -> Result<Json<Vec<OrderResponse>>, AppError> {
    let Some(uid) = user_id(&claims) else {
        return Ok(Json(Vec::new()));
    };

    let orders = state
        .orders
        .list_orders_for_user(uid)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

async fn get_order(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state
        .orders
        .get_order(id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError(format!("Order {} not found", id)))?;

    // Anyone else's order reads as absent, not forbidden. Guest orders
    // carry no user id and are never served here; guests follow theirs
    // through payment status polling instead.
    if order.user_id.is_none() || order.user_id != user_id(&claims) {
        return Err(AppError::NotFoundError(format!("Order {} not found", id)));
    }

    Ok(Json(order.into()))
}

fn to_lines(items: &[OrderLineRequest]) -> Vec<OrderLine> {
    items
        .iter()
        .map(|i| OrderLine {
            product_id: i.product_id,
            quantity: i.quantity,
        })
        .collect()
}

/// Guest subjects are `guest-{uuid}`; registered customers carry a bare uuid.
fn user_id(claims: &CustomerClaims) -> Option<Uuid> {
    claims
        .sub
        .strip_prefix("guest-")
        .unwrap_or(&claims.sub)
        .parse()
        .ok()
}
