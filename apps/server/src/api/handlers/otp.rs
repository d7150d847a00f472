use axum::{extract::State, Json};
use serde_json::{json, Value};

use super::Data;
use crate::{
    api::extractors::ApiJson,
    auth::{AuthenticatedPrincipal, PrincipalKind},
    services::{SendCode, VerifyCode},
    state::AppState,
    Result,
};

pub async fn send_code(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<SendCode>,
) -> Result<Json<Data<Value>>> {
    state.otp.send(&input).await?;
    Ok(Json(Data::new(json!({ "sent": true }))))
}

pub async fn verify_dressmaker(
    state: State<AppState>,
    principal: AuthenticatedPrincipal,
    input: ApiJson<VerifyCode>,
) -> Result<Json<Data<Value>>> {
    verify(state, principal, PrincipalKind::Dressmaker, input).await
}

pub async fn verify_user(
    state: State<AppState>,
    principal: AuthenticatedPrincipal,
    input: ApiJson<VerifyCode>,
) -> Result<Json<Data<Value>>> {
    verify(state, principal, PrincipalKind::User, input).await
}

async fn verify(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    kind: PrincipalKind,
    ApiJson(input): ApiJson<VerifyCode>,
) -> Result<Json<Data<Value>>> {
    state.otp.verify(&principal, kind, &input).await?;
    Ok(Json(Data::new(json!({ "verified": true }))))
}
