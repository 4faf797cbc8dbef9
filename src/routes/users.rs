use axum::{
    extract::{Path, State},
    routing::get,
    Extension, Json, Router,
};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{Film, UserId},
    routes::AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/users/:id/recommendations", get(recommend))
}

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<Vec<Film>>> {
    let films = state.recommendations.recommend(user_id).await?;

    tracing::info!(
        request_id = %request_id,
        user_id,
        recommended = films.len(),
        "Recommendations served"
    );

    Ok(Json(films))
}
