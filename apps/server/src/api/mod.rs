//! API layer - routes, handlers, and middleware

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod routes;

use crate::{config::StorageBackend, state::AppState};
use axum::{
    extract::State,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::json;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let max_body_size = state.config.server.max_request_body_size;
    let cors_origins = state.config.server.cors_origins.clone();

    let protected = routes::protected_routes().layer(axum::middleware::from_fn_with_state(
        state.clone(),
        crate::auth::auth_middleware,
    ));

    Router::new()
        .route("/health", get(health_check))
        .merge(routes::public_routes())
        .merge(protected)
        .with_state(state)
        // Layers wrap in reverse order; the last one added sees the request first
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(middleware::compression())
        .layer(middleware::cors(&cors_origins))
        .layer(middleware::body_limit(max_body_size))
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let storage = match state.config.database.backend {
        StorageBackend::Postgres => "postgres",
        StorageBackend::Firestore => "firestore",
        StorageBackend::Memory => "memory",
    };
    Json(json!({
        "status": "ok",
        "service": "costura",
        "storage": storage,
    }))
}
