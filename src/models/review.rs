use serde::{Deserialize, Serialize};

use super::{FilmId, ReviewId, UserId};

/// A user's review of a film
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "reviewId")]
    pub id: ReviewId,
    pub user_id: UserId,
    pub film_id: FilmId,
    pub is_positive: bool,
    pub content: String,
    /// Usefulness score; moved only by vote transitions
    pub useful: i64,
}

/// Polarity of a vote on a review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    Like,
    Dislike,
}

impl VoteKind {
    /// Stored as a boolean `is_like` column
    pub fn from_is_like(is_like: bool) -> Self {
        if is_like {
            VoteKind::Like
        } else {
            VoteKind::Dislike
        }
    }

    pub fn is_like(self) -> bool {
        matches!(self, VoteKind::Like)
    }
}
