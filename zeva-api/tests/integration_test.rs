use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

use zeva_api::middleware::auth::AdminClaims;
use zeva_api::state::{AppState, AuthConfig};
use zeva_api::app;
use zeva_catalog::Product;
use zeva_core::gateway::{
    CallbackKey, CallbackOutcome, GatewayError, GatewaySubmission, WalletCharge, WalletGateway,
};
use zeva_core::notify::Notifier;
use zeva_order::ledger::OrderLedger;
use zeva_payment::reconciler::PaymentReconciler;
use zeva_store::MemoryStore;

const JWT_SECRET: &str = "integration-test-secret";

// ============================================================================
// Test Doubles
// ============================================================================

/// Stand-in wallet provider registered under the jazzcash route. Accepts
/// every submission and reports callbacks keyed by transaction reference.
#[derive(Default)]
struct StubGateway {
    submissions: AtomicUsize,
}

#[async_trait]
impl WalletGateway for StubGateway {
    fn name(&self) -> &'static str {
        "jazzcash"
    }

    fn new_transaction_ref(&self) -> String {
        format!("T-STUB-{}", uuid::Uuid::new_v4().simple())
    }

    async fn submit(&self, charge: &WalletCharge) -> Result<GatewaySubmission, GatewayError> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        Ok(GatewaySubmission {
            transaction_ref: charge.transaction_ref.clone(),
            message: "Accepted".into(),
            payment_url: None,
        })
    }

    fn parse_callback(&self, payload: &Value) -> Result<CallbackOutcome, GatewayError> {
        let reference = payload["ref"]
            .as_str()
            .ok_or_else(|| GatewayError::MalformedCallback("missing ref".into()))?;
        Ok(CallbackOutcome {
            key: CallbackKey::TransactionRef(reference.to_string()),
            success: payload["ok"].as_bool().unwrap_or(false),
            provider_code: "000".into(),
            message: None,
        })
    }
}

#[derive(Default)]
struct CountingNotifier {
    sent: AtomicUsize,
}

#[async_trait]
impl Notifier for CountingNotifier {
    async fn notify(&self, _: &str, _: &str, _: i64, _: &str) -> bool {
        self.sent.fetch_add(1, Ordering::SeqCst);
        true
    }
}

struct Harness {
    app: Router,
    store: Arc<MemoryStore>,
    gateway: Arc<StubGateway>,
    notifier: Arc<CountingNotifier>,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let gateway = Arc::new(StubGateway::default());
    let notifier = Arc::new(CountingNotifier::default());

    let reconciler = PaymentReconciler::new(store.clone(), notifier.clone())
        .with_gateway(gateway.clone());

    let state = AppState {
        products: store.clone(),
        categories: store.clone(),
        offers: store.clone(),
        orders: store.clone(),
        ledger: Arc::new(OrderLedger::new(store.clone(), store.clone())),
        reconciler: Arc::new(reconciler),
        auth: AuthConfig {
            secret: JWT_SECRET.into(),
            expiration: 3600,
        },
    };

    Harness {
        app: app(state),
        store,
        gateway,
        notifier,
    }
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    send_with_token(app, method, uri, body, None).await
}

async fn send_with_token(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(v) => Body::from(v.to_string()),
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

fn admin_token() -> String {
    let claims = AdminClaims {
        sub: "admin-1".into(),
        email: Some("admin@example.com".into()),
        role: "ADMIN".into(),
        exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

async fn seed_product(store: &MemoryStore, name: &str, retail: i64, offer: Option<i64>, stock: i32) -> Product {
    use zeva_catalog::repository::ProductRepository;
    let mut product = Product::new(name, retail, stock);
    product.offer_price_paisa = offer;
    store.create_product(&product).await.unwrap();
    product
}

fn guest_order_body(product: &Product, quantity: i32) -> Value {
    json!({
        "customer_name": "Amna Khan",
        "customer_email": "amna@example.com",
        "customer_phone": "03001234567",
        "shipping_address": "House 4, Gulberg, Lahore",
        "payment_method": "jazzcash",
        "items": [{ "product_id": product.id, "quantity": quantity }],
    })
}

// ============================================================================
// Orders
// ============================================================================

#[tokio::test]
async fn guest_order_totals_offer_price_and_reserves_stock() {
    let h = harness();
    let product = seed_product(&h.store, "Pearl Ring", 50000, Some(45000), 10).await;

    let (status, body) = send(&h.app, "POST", "/orders/guest", Some(guest_order_body(&product, 2))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_amount_paisa"], 90000);
    assert_eq!(body["total_amount"], "900.00");
    assert_eq!(body["payment_status"], "pending");
    assert!(body["order_number"].as_str().unwrap().starts_with("ZV-"));

    use zeva_catalog::repository::ProductRepository;
    let after = h.store.get_product(product.id).await.unwrap().unwrap();
    assert_eq!(after.stock, 8);
}

#[tokio::test]
async fn over_order_is_rejected_and_stock_untouched() {
    let h = harness();
    let product = seed_product(&h.store, "Gold Bangle", 120000, None, 3).await;

    let (status, body) = send(&h.app, "POST", "/orders/guest", Some(guest_order_body(&product, 5))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Insufficient stock"));

    use zeva_catalog::repository::ProductRepository;
    let after = h.store.get_product(product.id).await.unwrap().unwrap();
    assert_eq!(after.stock, 3);
}

#[tokio::test]
async fn my_orders_requires_a_token() {
    let h = harness();
    let (status, _) = send(&h.app, "GET", "/orders/my-orders", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn guest_token_opens_customer_routes() {
    let h = harness();
    let (status, body) = send(&h.app, "POST", "/auth/guest", None).await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) =
        send_with_token(&h.app, "GET", "/orders/my-orders", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

// ============================================================================
// Payments
// ============================================================================

async fn place_and_initiate(h: &Harness) -> (String, String) {
    let product = seed_product(&h.store, "Choker", 200000, None, 5).await;
    let (_, order) = send(&h.app, "POST", "/orders/guest", Some(guest_order_body(&product, 1))).await;
    let order_number = order["order_number"].as_str().unwrap().to_string();

    let (status, body) = send(
        &h.app,
        "POST",
        "/payments/jazzcash",
        Some(json!({
            "order_id": order_number,
            "amount_paisa": 200000,
            "mobile_number": "03111234567",
            "cnic": "1234",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let reference = body["transaction_ref"].as_str().unwrap().to_string();
    (order_number, reference)
}

#[tokio::test]
async fn invalid_mobile_number_never_reaches_the_gateway() {
    let h = harness();
    let product = seed_product(&h.store, "Stud Set", 30000, None, 5).await;
    let (_, order) = send(&h.app, "POST", "/orders/guest", Some(guest_order_body(&product, 1))).await;

    let (status, _) = send(
        &h.app,
        "POST",
        "/payments/jazzcash",
        Some(json!({
            "order_id": order["order_number"],
            "amount_paisa": 30000,
            "mobile_number": "0311234567",
            "cnic": "1234",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(h.gateway.submissions.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn duplicate_success_callback_notifies_once() {
    let h = harness();
    let (order_number, reference) = place_and_initiate(&h).await;

    let payload = json!({ "ref": reference, "ok": true });
    let (status, body) = send(&h.app, "POST", "/payments/jazzcash/callback", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applied"], true);

    let (status, body) = send(&h.app, "POST", "/payments/jazzcash/callback", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applied"], false);

    assert_eq!(h.notifier.sent.load(Ordering::SeqCst), 1);

    use zeva_order::repository::OrderRepository;
    let order = h.store.get_order_by_number(&order_number).await.unwrap().unwrap();
    assert_eq!(order.payment_status, zeva_order::models::PaymentStatus::Success);
}

#[tokio::test]
async fn conflicting_terminal_callback_keeps_first_result() {
    let h = harness();
    let (order_number, reference) = place_and_initiate(&h).await;

    send(&h.app, "POST", "/payments/jazzcash/callback", Some(json!({ "ref": reference, "ok": true }))).await;
    let (_, body) = send(&h.app, "POST", "/payments/jazzcash/callback", Some(json!({ "ref": reference, "ok": false }))).await;
    assert_eq!(body["applied"], false);

    use zeva_order::repository::OrderRepository;
    let order = h.store.get_order_by_number(&order_number).await.unwrap().unwrap();
    assert_eq!(order.payment_status, zeva_order::models::PaymentStatus::Success);
}

#[tokio::test]
async fn malformed_callback_is_absorbed() {
    let h = harness();
    let (status, body) = send(
        &h.app,
        "POST",
        "/payments/jazzcash/callback",
        Some(json!({ "unexpected": "shape" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "received");
}

#[tokio::test]
async fn unknown_transaction_polls_as_not_found_sentinel() {
    let h = harness();
    let (status, body) = send(&h.app, "GET", "/payments/status/T-NOPE", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "not_found");
}

#[tokio::test]
async fn status_poll_reports_order_details_after_callback() {
    let h = harness();
    let (order_number, reference) = place_and_initiate(&h).await;
    send(&h.app, "POST", "/payments/jazzcash/callback", Some(json!({ "ref": reference, "ok": true }))).await;

    let (status, body) = send(&h.app, "GET", &format!("/payments/status/{reference}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["order_number"], order_number);
    assert_eq!(body["amount"], "2000.00");
}

#[tokio::test]
async fn guest_orders_hide_from_authenticated_lookups() {
    let h = harness();
    let product = seed_product(&h.store, "Hoop Earrings", 35000, None, 4).await;
    let (_, order) = send(&h.app, "POST", "/orders/guest", Some(guest_order_body(&product, 1))).await;
    let order_id = order["id"].as_str().unwrap().to_string();

    let (_, body) = send(&h.app, "POST", "/auth/guest", None).await;
    let token = body["token"].as_str().unwrap().to_string();

    let (status, _) = send_with_token(
        &h.app,
        "GET",
        &format!("/orders/{order_id}"),
        None,
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Offers
// ============================================================================

#[tokio::test]
async fn under_299_lists_only_budget_products() {
    let h = harness();
    seed_product(&h.store, "Anklet", 25000, None, 5).await;
    seed_product(&h.store, "Studs", 40000, Some(29900), 5).await;
    seed_product(&h.store, "Choker", 80000, None, 5).await;

    let (status, body) = send(&h.app, "GET", "/offers/under_299", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Anklet", "Studs"]);

    let (status, _) = send(&h.app, "GET", "/offers/flash_sale", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn linked_offer_feeds_the_special_deals_listing() {
    let h = harness();
    let token = admin_token();
    let product = seed_product(&h.store, "Jhumka", 150000, None, 5).await;

    let now = chrono::Utc::now();
    let (status, offer) = send_with_token(
        &h.app,
        "POST",
        "/admin/offers",
        Some(json!({
            "name": "Eid Special",
            "offer_type": "special_deals",
            "discount_percent": 20,
            "start_date": (now - chrono::Duration::days(1)).to_rfc3339(),
            "end_date": (now + chrono::Duration::days(7)).to_rfc3339(),
        })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let offer_id = offer["id"].as_str().unwrap().to_string();

    // Listing is empty until the product is linked.
    let (_, body) = send(&h.app, "GET", "/offers/special_deals", None).await;
    assert_eq!(body, json!([]));

    let (status, _) = send_with_token(
        &h.app,
        "POST",
        &format!("/admin/offers/{offer_id}/products/{}", product.id),
        None,
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Linking again is a client error, not a silent no-op.
    let (status, err) = send_with_token(
        &h.app,
        "POST",
        &format!("/admin/offers/{offer_id}/products/{}", product.id),
        None,
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["error"].as_str().unwrap().contains("already linked"));

    let (_, body) = send(&h.app, "GET", "/offers/special_deals", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "Jhumka");

    // Retiring the offer empties the listing but keeps the row listed
    // for the admin view.
    let (status, _) = send_with_token(
        &h.app,
        "DELETE",
        &format!("/admin/offers/{offer_id}"),
        None,
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&h.app, "GET", "/offers/special_deals", None).await;
    assert_eq!(body, json!([]));

    let (_, offers) = send_with_token(&h.app, "GET", "/admin/offers", None, Some(&token)).await;
    assert_eq!(offers.as_array().unwrap().len(), 1);
    assert_eq!(offers[0]["is_active"], false);
}

#[tokio::test]
async fn unlinking_a_missing_link_is_not_found() {
    let h = harness();
    let token = admin_token();
    let product = seed_product(&h.store, "Tikka", 60000, None, 2).await;

    let now = chrono::Utc::now();
    let (_, offer) = send_with_token(
        &h.app,
        "POST",
        "/admin/offers",
        Some(json!({
            "name": "Deal of the Month",
            "offer_type": "deal_of_month",
            "start_date": (now - chrono::Duration::days(1)).to_rfc3339(),
            "end_date": (now + chrono::Duration::days(29)).to_rfc3339(),
        })),
        Some(&token),
    )
    .await;
    let offer_id = offer["id"].as_str().unwrap().to_string();

    let (status, _) = send_with_token(
        &h.app,
        "DELETE",
        &format!("/admin/offers/{offer_id}/products/{}", product.id),
        None,
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Catalog & Admin
// ============================================================================

#[tokio::test]
async fn public_catalog_exposes_legacy_aliases() {
    let h = harness();
    let product = seed_product(&h.store, "Pendant", 50000, Some(45000), 7).await;

    let (status, body) = send(&h.app, "GET", &format!("/products/{}", product.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price"], "450.00");
    assert_eq!(body["retail_price"], "500.00");
    assert_eq!(body["stock_quantity"], 7);
}

#[tokio::test]
async fn admin_routes_reject_customer_tokens() {
    let h = harness();
    let (_, body) = send(&h.app, "POST", "/auth/guest", None).await;
    let token = body["token"].as_str().unwrap().to_string();

    let (status, _) = send_with_token(
        &h.app,
        "POST",
        "/admin/collections",
        Some(json!({ "name": "Bridal" })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn duplicate_collection_name_conflicts() {
    let h = harness();
    let token = admin_token();

    let body = json!({ "name": "Bridal", "description": "Wedding sets" });
    let (status, _) =
        send_with_token(&h.app, "POST", "/admin/collections", Some(body.clone()), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, err) =
        send_with_token(&h.app, "POST", "/admin/collections", Some(body), Some(&token)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(err["error"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn admin_moves_order_through_fulfillment() {
    let h = harness();
    let token = admin_token();
    let product = seed_product(&h.store, "Nose Pin", 15000, None, 2).await;
    let (_, order) = send(&h.app, "POST", "/orders/guest", Some(guest_order_body(&product, 1))).await;
    let order_id = order["id"].as_str().unwrap().to_string();

    let (status, body) = send_with_token(
        &h.app,
        "PUT",
        &format!("/admin/orders/{order_id}/status"),
        Some(json!({ "status": "shipped" })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "shipped");

    let (status, _) = send_with_token(
        &h.app,
        "PUT",
        &format!("/admin/orders/{order_id}/status"),
        Some(json!({ "status": "returned" })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn collection_products_route_filters_by_collection() {
    let h = harness();
    let token = admin_token();

    let (_, collection) = send_with_token(
        &h.app,
        "POST",
        "/admin/collections",
        Some(json!({ "name": "Bridal" })),
        Some(&token),
    )
    .await;
    let collection_id: uuid::Uuid = collection["id"].as_str().unwrap().parse().unwrap();

    use zeva_catalog::repository::ProductRepository;
    let mut in_collection = Product::new("Bridal Set", 900000, 2);
    in_collection.category_id = Some(collection_id);
    h.store.create_product(&in_collection).await.unwrap();
    seed_product(&h.store, "Loose Stone", 10000, None, 5).await;

    let (status, body) = send(
        &h.app,
        "GET",
        &format!("/collections/{collection_id}/products"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "Bridal Set");

    let (status, _) = send(
        &h.app,
        "GET",
        &format!("/collections/{}/products", uuid::Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_sees_every_order_newest_first() {
    let h = harness();
    let token = admin_token();
    let product = seed_product(&h.store, "Ring", 50000, None, 10).await;

    let (_, first) = send(&h.app, "POST", "/orders/guest", Some(guest_order_body(&product, 1))).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let (_, second) = send(&h.app, "POST", "/orders/guest", Some(guest_order_body(&product, 1))).await;

    let (status, body) = send_with_token(&h.app, "GET", "/admin/orders", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["order_number"], second["order_number"]);
    assert_eq!(listed[1]["order_number"], first["order_number"]);
}

#[tokio::test]
async fn admin_restock_raises_stock() {
    let h = harness();
    let token = admin_token();
    let product = seed_product(&h.store, "Anklet", 40000, None, 1).await;

    let (status, body) = send_with_token(
        &h.app,
        "POST",
        &format!("/admin/products/{}/restock", product.id),
        Some(json!({ "quantity": 9 })),
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stock_quantity"], 10);
}
