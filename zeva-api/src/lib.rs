use axum::{http::Method, middleware::from_fn_with_state, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod auth;
pub mod collections;
pub mod error;
pub mod middleware;
pub mod offers;
pub mod orders;
pub mod payments;
pub mod products;
pub mod state;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    let customer = orders::customer_routes().layer(from_fn_with_state(
        state.clone(),
        middleware::auth::customer_auth_middleware,
    ));

    let admin = admin::routes().merge(offers::admin_routes()).layer(
        from_fn_with_state(state.clone(), middleware::auth::admin_auth_middleware),
    );

    Router::new()
        .merge(auth::routes())
        .merge(products::routes())
        .merge(collections::routes())
        .merge(offers::routes())
        .merge(orders::public_routes())
        .merge(payments::routes())
        .merge(customer)
        .merge(admin)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
