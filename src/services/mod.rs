use crate::error::{AppError, AppResult};

pub mod assembler;
pub mod like_graph;
pub mod recommendations;
pub mod review_scoring;
pub mod search;

#[cfg(test)]
pub(crate) mod test_support;

pub use like_graph::{LikeGraph, LikeService, PopularQuery};
pub use recommendations::RecommendationService;
pub use review_scoring::{ReviewScoringService, VoteAction};
pub use search::{DirectorSort, SearchFields, SearchService};

/// Validate a caller-supplied result limit before any store access
pub(crate) fn validate_limit(value: i64, name: &str) -> AppResult<usize> {
    if value < 1 {
        return Err(AppError::InvalidInput(format!(
            "{} must be at least 1, got {}",
            name, value
        )));
    }

    usize::try_from(value)
        .map_err(|_| AppError::InvalidInput(format!("{} is too large: {}", name, value)))
}
