use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use zeva_core::money::format_rupees;
use zeva_payment::reconciler::InitiateRequest;

use crate::{error::AppError, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct InitiatePaymentRequest {
    /// Human-readable order number, the reference customers see.
    pub order_id: String,
    pub amount_paisa: i64,
    pub mobile_number: String,
    pub cnic: String,
}

#[derive(Debug, Serialize)]
pub struct InitiatePaymentResponse {
    pub transaction_ref: String,
    pub message: String,
    pub payment_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaymentStatusResponse {
    pub transaction_ref: String,
    pub status: String,
    pub message: String,
    pub order_number: Option<String>,
    pub amount: Option<String>,
}

// ============================================================================
// Routers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payments/jazzcash", post(initiate_jazzcash))
        .route("/payments/easypaisa", post(initiate_easypaisa))
        .route("/payments/status/{transaction_ref}", get(payment_status))
        .route("/payments/jazzcash/callback", post(jazzcash_callback))
        .route("/payments/easypaisa/callback", post(easypaisa_callback))
}

// ============================================================================
// Handlers
// ============================================================================

async fn initiate_jazzcash(
    State(state): State<AppState>,
    Json(req): Json<InitiatePaymentRequest>,
) -> Result<Json<InitiatePaymentResponse>, AppError> {
    initiate(&state, "jazzcash", req).await
}

async fn initiate_easypaisa(
    State(state): State<AppState>,
    Json(req): Json<InitiatePaymentRequest>,
) -> Result<Json<InitiatePaymentResponse>, AppError> {
    initiate(&state, "easypaisa", req).await
}

async fn initiate(
    state: &AppState,
    gateway: &str,
    req: InitiatePaymentRequest,
) -> Result<Json<InitiatePaymentResponse>, AppError> {
    let outcome = state
        .reconciler
        .initiate(
            gateway,
            &InitiateRequest {
                order_number: req.order_id,
                amount_paisa: req.amount_paisa,
                mobile_number: req.mobile_number,
                cnic_last4: req.cnic,
            },
        )
        .await
        .map_err(AppError::from_payment)?;

    Ok(Json(InitiatePaymentResponse {
        transaction_ref: outcome.transaction_ref,
        message: outcome.message,
        payment_url: outcome.payment_url,
    }))
}

async fn payment_status(
    State(state): State<AppState>,
    Path(transaction_ref): Path<String>,
) -> Result<Json<PaymentStatusResponse>, AppError> {
    let view = state
        .reconciler
        .status(&transaction_ref)
        .await
        .map_err(AppError::from_payment)?;

    Ok(Json(PaymentStatusResponse {
        transaction_ref: view.transaction_ref,
        status: view.status,
        message: view.message,
        order_number: view.order_number,
        amount: view.amount_paisa.map(format_rupees),
    }))
}

async fn jazzcash_callback(State(state): State<AppState>, Json(payload): Json<Value>) -> Json<Value> {
    callback(&state, "jazzcash", payload).await
}

async fn easypaisa_callback(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Json<Value> {
    callback(&state, "easypaisa", payload).await
}

/// Providers retry on anything but a 2xx, so processing errors are logged
/// and acknowledged rather than surfaced.
async fn callback(state: &AppState, gateway: &str, payload: Value) -> Json<Value> {
    match state.reconciler.handle_callback(gateway, &payload).await {
        Ok(receipt) => Json(json!({
            "reference": receipt.reference,
            "status": receipt.status.as_str(),
            "applied": receipt.applied,
        })),
        Err(err) => {
            tracing::error!(gateway, error = %err, "callback processing failed");
            Json(json!({ "status": "received" }))
        }
    }
}
