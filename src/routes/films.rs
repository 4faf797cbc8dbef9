use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{DirectorId, Film, FilmId, GenreId, UserId},
    routes::AppState,
    services::{DirectorSort, SearchFields},
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/films/:id/like/:user_id", put(add_like).delete(remove_like))
        .route("/films/popular", get(popular))
        .route("/films/common", get(common))
        .route("/films/director/:director_id", get(director_films))
        .route("/films/search", get(search))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularParams {
    pub count: Option<i64>,
    pub genre_id: Option<GenreId>,
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonParams {
    pub user_id: UserId,
    pub friend_id: UserId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorParams {
    pub sort_by: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
    pub by: String,
}

/// Handler for adding a like
pub async fn add_like(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path((film_id, user_id)): Path<(FilmId, UserId)>,
) -> AppResult<StatusCode> {
    tracing::info!(request_id = %request_id, film_id, user_id, "Processing like");

    state.likes.add_like(film_id, user_id).await?;
    Ok(StatusCode::OK)
}

/// Handler for removing a like
pub async fn remove_like(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path((film_id, user_id)): Path<(FilmId, UserId)>,
) -> AppResult<StatusCode> {
    tracing::info!(request_id = %request_id, film_id, user_id, "Processing unlike");

    state.likes.remove_like(film_id, user_id).await?;
    Ok(StatusCode::OK)
}

/// Handler for the popularity ranking
pub async fn popular(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PopularParams>,
) -> AppResult<Json<Vec<Film>>> {
    let films = state
        .likes
        .popular_films(params.count, params.genre_id, params.year)
        .await?;
    Ok(Json(films))
}

/// Handler for films liked by both a user and a friend
pub async fn common(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CommonParams>,
) -> AppResult<Json<Vec<Film>>> {
    let films = state
        .likes
        .common_films(params.user_id, params.friend_id)
        .await?;
    Ok(Json(films))
}

/// Handler for a director's films
pub async fn director_films(
    State(state): State<Arc<AppState>>,
    Path(director_id): Path<DirectorId>,
    Query(params): Query<DirectorParams>,
) -> AppResult<Json<Vec<Film>>> {
    let sort: DirectorSort = params.sort_by.parse()?;
    let films = state.search.director_films(director_id, sort).await?;
    Ok(Json(films))
}

/// Handler for title/director search
pub async fn search(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<Film>>> {
    let fields: SearchFields = params.by.parse()?;

    let films = state.search.search(&params.query, fields).await?;

    tracing::info!(
        request_id = %request_id,
        query = %params.query,
        result_count = films.len(),
        "Search completed"
    );

    Ok(Json(films))
}
