use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;

use super::Data;
use crate::{
    api::extractors::ApiJson,
    auth::AuthenticatedPrincipal,
    models::{CreateSubscription, Subscription},
    services::WebhookOutcome,
    state::AppState,
    Result,
};

const SIGNATURE_HEADER: &str = "stripe-signature";

pub async fn create_subscription(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    ApiJson(input): ApiJson<CreateSubscription>,
) -> Result<(StatusCode, Json<Data<Subscription>>)> {
    let subscription = state.subscriptions.create(&principal, &input).await?;
    Ok((StatusCode::CREATED, Json(Data::new(subscription))))
}

/// Payment provider callback; authenticated by its signature header, not a token.
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookOutcome>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    let outcome = state
        .subscriptions
        .handle_webhook(&body, signature, Utc::now())
        .await?;
    Ok(Json(outcome))
}
