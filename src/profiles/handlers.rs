use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    error::ProfileError,
    profiles::{
        dto::{Pagination, Profile, ProfilePayload, SearchQuery},
        services,
    },
    state::AppState,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/api/profiles", get(list_profiles).post(create_profile))
        .route("/api/profiles/search", get(search_profiles))
        .route(
            "/api/profiles/:id",
            get(get_profile).put(update_profile).delete(delete_profile),
        )
}

fn profile_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ProfileError> {
    path.map(|Path(id)| id)
        .map_err(|rejection| ProfileError::BadRequest(rejection.body_text()))
}

fn body(payload: Result<Json<ProfilePayload>, JsonRejection>) -> Result<ProfilePayload, ProfileError> {
    payload
        .map(|Json(p)| p)
        .map_err(|rejection| ProfileError::BadRequest(rejection.body_text()))
}

#[instrument(skip(state))]
pub async fn list_profiles(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Profile>>, ProfileError> {
    let profiles = services::list_profiles(state.store.as_ref(), &page).await?;
    Ok(Json(profiles))
}

#[instrument(skip(state))]
pub async fn search_profiles(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Profile>>, ProfileError> {
    let profiles = services::search_profiles(state.store.as_ref(), &query).await?;
    Ok(Json(profiles))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Profile>, ProfileError> {
    let id = profile_id(path)?;
    let profile = services::get_profile(state.store.as_ref(), id).await?;
    Ok(Json(profile))
}

#[instrument(skip(state, payload))]
pub async fn create_profile(
    State(state): State<AppState>,
    payload: Result<Json<ProfilePayload>, JsonRejection>,
) -> Result<impl IntoResponse, ProfileError> {
    let profile = services::create_profile(state.store.as_ref(), body(payload)?).await?;
    let location = format!("/api/profiles/{}", profile.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(profile)))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ProfilePayload>, JsonRejection>,
) -> Result<Json<Profile>, ProfileError> {
    let id = profile_id(path)?;
    let profile = services::update_profile(state.store.as_ref(), id, body(payload)?).await?;
    Ok(Json(profile))
}

#[instrument(skip(state))]
pub async fn delete_profile(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ProfileError> {
    let id = profile_id(path)?;
    services::delete_profile(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
