use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zeva_api::{
    app,
    state::{AppState, AuthConfig},
};
use zeva_catalog::repository::{CategoryRepository, OfferRepository, ProductRepository};
use zeva_core::notify::{Notifier, NoopNotifier};
use zeva_order::ledger::OrderLedger;
use zeva_order::repository::OrderRepository;
use zeva_payment::easypaisa::EasyPaisaGateway;
use zeva_payment::jazzcash::JazzCashGateway;
use zeva_payment::reconciler::PaymentReconciler;
use zeva_store::{DbClient, MemoryStore, PgCatalogRepository, PgOrderRepository, WebhookNotifier};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zeva_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = zeva_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Zeva API on port {}", config.server.port);

    let (products, categories, offers, orders): (
        Arc<dyn ProductRepository>,
        Arc<dyn CategoryRepository>,
        Arc<dyn OfferRepository>,
        Arc<dyn OrderRepository>,
    ) = if config.database.is_in_memory() {
        tracing::warn!("Using in-memory store; data will not survive a restart");
        let store = Arc::new(MemoryStore::new());
        (store.clone(), store.clone(), store.clone(), store)
    } else {
        let db = DbClient::new(&config.database.url)
            .await
            .expect("Failed to connect to Postgres");
        db.migrate().await.expect("Failed to run migrations");
        let catalog = Arc::new(PgCatalogRepository::new(db.clone()));
        (
            catalog.clone(),
            catalog.clone(),
            catalog,
            Arc::new(PgOrderRepository::new(db)),
        )
    };

    let notifier: Arc<dyn Notifier> = match &config.notifications.webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(url.clone())),
        None => Arc::new(NoopNotifier),
    };

    let reconciler = PaymentReconciler::new(orders.clone(), notifier)
        .with_gateway(Arc::new(JazzCashGateway::new(config.jazzcash.clone())))
        .with_gateway(Arc::new(EasyPaisaGateway::new(config.easypaisa.clone())));

    let app_state = AppState {
        ledger: Arc::new(OrderLedger::new(products.clone(), orders.clone())),
        reconciler: Arc::new(reconciler),
        products,
        categories,
        offers,
        orders,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
