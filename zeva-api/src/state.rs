use std::sync::Arc;
use zeva_catalog::repository::{CategoryRepository, OfferRepository, ProductRepository};
use zeva_order::ledger::OrderLedger;
use zeva_order::repository::OrderRepository;
use zeva_payment::reconciler::PaymentReconciler;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub products: Arc<dyn ProductRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub offers: Arc<dyn OfferRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub ledger: Arc<OrderLedger>,
    pub reconciler: Arc<PaymentReconciler>,
    pub auth: AuthConfig,
}
