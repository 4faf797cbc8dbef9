use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{FilmId, Review, ReviewId, UserId},
    routes::AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/reviews", get(top_reviews))
        .route("/reviews/:id/like/:user_id", put(like).delete(remove_like))
        .route("/reviews/:id/dislike/:user_id", put(dislike).delete(remove_dislike))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewListParams {
    pub film_id: Option<FilmId>,
    pub count: Option<i64>,
}

pub async fn top_reviews(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReviewListParams>,
) -> AppResult<Json<Vec<Review>>> {
    let reviews = state
        .reviews
        .top_reviews(params.film_id, params.count)
        .await?;
    Ok(Json(reviews))
}

pub async fn like(
    State(state): State<Arc<AppState>>,
    Path((review_id, user_id)): Path<(ReviewId, UserId)>,
) -> AppResult<Json<Review>> {
    Ok(Json(state.reviews.like(review_id, user_id).await?))
}

pub async fn dislike(
    State(state): State<Arc<AppState>>,
    Path((review_id, user_id)): Path<(ReviewId, UserId)>,
) -> AppResult<Json<Review>> {
    Ok(Json(state.reviews.dislike(review_id, user_id).await?))
}

pub async fn remove_like(
    State(state): State<Arc<AppState>>,
    Path((review_id, user_id)): Path<(ReviewId, UserId)>,
) -> AppResult<Json<Review>> {
    Ok(Json(state.reviews.remove_like(review_id, user_id).await?))
}

pub async fn remove_dislike(
    State(state): State<Arc<AppState>>,
    Path((review_id, user_id)): Path<(ReviewId, UserId)>,
) -> AppResult<Json<Review>> {
    Ok(Json(state.reviews.remove_dislike(review_id, user_id).await?))
}
