//! Route tables

use axum::{
    routing::{get, post},
    Router,
};

use crate::api::handlers::{dressmakers, otp, subscriptions, users};
use crate::state::AppState;

/// Routes reachable without a bearer token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/dressmakers",
            get(dressmakers::list_dressmakers).post(dressmakers::create_dressmaker),
        )
        .route("/dressmakers/services", get(dressmakers::list_services))
        .route("/dressmakers/auth", post(dressmakers::authenticate_dressmaker))
        .route("/dressmakers/:id", get(dressmakers::show_dressmaker))
        .route("/users", post(users::create_user))
        .route("/users/auth", post(users::authenticate_user))
        .route("/otp", post(otp::send_code))
        .route("/stripe/webhook", post(subscriptions::payment_webhook))
}

/// Routes that need a verified principal; the caller layers the auth middleware.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/dressmakers/:id",
            axum::routing::put(dressmakers::update_dressmaker),
        )
        .route("/dressmakers/:id/reviews", post(dressmakers::create_review))
        .route("/otp/dressmaker/verify", post(otp::verify_dressmaker))
        .route("/otp/user/verify", post(otp::verify_user))
        .route("/subscriptions", post(subscriptions::create_subscription))
}
