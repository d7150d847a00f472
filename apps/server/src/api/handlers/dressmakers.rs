use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use super::Data;
use crate::{
    api::extractors::{ApiJson, ApiPath, ApiQuery},
    auth::AuthenticatedPrincipal,
    models::{CreateDressmaker, CreateReview, Dressmaker, Review, UpdateDressmaker},
    services::{Credentials, DiscoveryQuery, DressmakerProfile, Page, Session},
    state::AppState,
    Result,
};

pub async fn create_dressmaker(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateDressmaker>,
) -> Result<(StatusCode, Json<Data<Dressmaker>>)> {
    let dressmaker = state.dressmakers.create(input).await?;
    Ok((StatusCode::CREATED, Json(Data::new(dressmaker))))
}

/// `GET /dressmakers` with optional proximity and keyword filters.
pub async fn list_dressmakers(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<DiscoveryQuery>,
) -> Result<Json<Page<Dressmaker>>> {
    Ok(Json(state.dressmakers.discover(&query).await?))
}

pub async fn list_services(State(state): State<AppState>) -> Result<Json<Data<Vec<String>>>> {
    Ok(Json(Data::new(state.dressmakers.services_catalog().await?)))
}

pub async fn show_dressmaker(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Data<DressmakerProfile>>> {
    Ok(Json(Data::new(state.dressmakers.show(id).await?)))
}

pub async fn update_dressmaker(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<UpdateDressmaker>,
) -> Result<Json<Data<Dressmaker>>> {
    let dressmaker = state.dressmakers.update(&principal, id, input).await?;
    Ok(Json(Data::new(dressmaker)))
}

pub async fn create_review(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<CreateReview>,
) -> Result<(StatusCode, Json<Data<Review>>)> {
    let review = state.dressmakers.add_review(&principal, id, input).await?;
    Ok((StatusCode::CREATED, Json(Data::new(review))))
}

pub async fn authenticate_dressmaker(
    State(state): State<AppState>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> Result<Json<Session<Dressmaker>>> {
    Ok(Json(state.sessions.login_dressmaker(&credentials).await?))
}
