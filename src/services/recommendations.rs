use std::sync::Arc;

use crate::{
    db::EntityStore,
    error::AppResult,
    models::{Film, UserId},
    services::like_graph::LikeGraph,
};

/// Generates personalized film recommendations
///
/// Finds the single user whose likes overlap most with the target user's and
/// suggests whatever that neighbour liked that the target has not. No
/// weighting and no blending across several neighbours.
pub struct RecommendationService {
    store: Arc<dyn EntityStore>,
}

impl RecommendationService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Films liked by the nearest neighbour and not yet by `user_id`, by film id
    pub async fn recommend(&self, user_id: UserId) -> AppResult<Vec<Film>> {
        self.store.get_user(user_id).await?;

        let graph = LikeGraph::load(self.store.as_ref()).await?;
        let Some(neighbour) = graph.most_similar_user(user_id) else {
            tracing::debug!(user_id, "No neighbour with shared likes");
            return Ok(Vec::new());
        };

        let already_liked = graph.liked_films(user_id);
        let candidates: Vec<_> = graph
            .liked_films(neighbour)
            .difference(&already_liked)
            .copied()
            .collect();

        tracing::info!(
            user_id,
            neighbour,
            candidate_count = candidates.len(),
            "Computed recommendations"
        );

        let mut films = Vec::with_capacity(candidates.len());
        for film_id in candidates {
            films.push(self.store.get_film(film_id).await?);
        }

        Ok(films)
    }
}
