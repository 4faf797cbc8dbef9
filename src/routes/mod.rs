use axum::{http::StatusCode, middleware, routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::{
    config::Config,
    db::{EntityStore, EventFeed},
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    services::{LikeService, RecommendationService, ReviewScoringService, SearchService},
};

pub mod films;
pub mod reviews;
pub mod users;

/// Services shared by every handler
pub struct AppState {
    pub likes: LikeService,
    pub recommendations: RecommendationService,
    pub reviews: ReviewScoringService,
    pub search: SearchService,
}

impl AppState {
    pub fn new(store: Arc<dyn EntityStore>, feed: Arc<dyn EventFeed>, config: &Config) -> Self {
        Self {
            likes: LikeService::new(store.clone(), feed)
                .with_default_limit(config.popular_default_limit),
            recommendations: RecommendationService::new(store.clone()),
            reviews: ReviewScoringService::new(store.clone())
                .with_default_limit(config.review_default_limit),
            search: SearchService::new(store),
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(films::routes())
        .merge(users::routes())
        .merge(reviews::routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
