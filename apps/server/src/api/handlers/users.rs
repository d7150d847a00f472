use axum::{extract::State, http::StatusCode, Json};

use super::Data;
use crate::{
    api::extractors::ApiJson,
    models::{CreateUser, User},
    services::{Credentials, Session},
    state::AppState,
    Result,
};

pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateUser>,
) -> Result<(StatusCode, Json<Data<User>>)> {
    let user = state.users.create(input).await?;
    Ok((StatusCode::CREATED, Json(Data::new(user))))
}

pub async fn authenticate_user(
    State(state): State<AppState>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> Result<Json<Session<User>>> {
    Ok(Json(state.sessions.login_user(&credentials).await?))
}
