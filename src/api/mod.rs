mod handlers;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::ledger::Ledger;

/// Build the HTTP API. `cors_origins` of `None` allows any origin.
pub fn create_router(ledger: Ledger, cors_origins: Option<Vec<String>>) -> Router {
    let api = Router::new()
        // Members
        .route(
            "/members",
            get(handlers::list_members).post(handlers::add_member),
        )
        // Expenses
        .route(
            "/expenses",
            get(handlers::list_expenses).post(handlers::add_expense),
        )
        .route(
            "/expenses/{id}",
            get(handlers::get_expense)
                .put(handlers::update_expense)
                .delete(handlers::delete_expense),
        )
        // Balances
        .route("/recompute", post(handlers::recompute))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(cors_origins)),
        )
        .with_state(ledger)
}

fn cors_layer(origins: Option<Vec<String>>) -> CorsLayer {
    let Some(origins) = origins else {
        return CorsLayer::permissive();
    };

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}
