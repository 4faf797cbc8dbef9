use crate::{
    error::AppResult,
    models::{
        Director, DirectorId, Film, FilmId, FilmRow, Genre, GenreId, LikeEdge, Review, ReviewId,
        User, UserId,
    },
    services::review_scoring::VoteAction,
};

/// Persistence collaborator for the ranking and scoring core
///
/// Point lookups return `AppError::NotFound` for missing ids. Bulk scans are
/// bounded by the size of the catalog. Every mutation is a single atomic step
/// from the caller's point of view.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait EntityStore: Send + Sync {
    /// Fetch a film aggregate with its genres and directors
    async fn get_film(&self, id: FilmId) -> AppResult<Film>;

    async fn get_user(&self, id: UserId) -> AppResult<User>;

    async fn get_review(&self, id: ReviewId) -> AppResult<Review>;

    async fn get_genre(&self, id: GenreId) -> AppResult<Genre>;

    async fn get_director(&self, id: DirectorId) -> AppResult<Director>;

    /// Scan the whole catalog as flat join rows, ordered by film id
    async fn film_rows(&self) -> AppResult<Vec<FilmRow>>;

    /// Scan every user→film like edge
    async fn like_edges(&self) -> AppResult<Vec<LikeEdge>>;

    /// Insert a like edge; returns false if it already existed
    async fn insert_like(&self, edge: LikeEdge) -> AppResult<bool>;

    /// Delete a like edge; returns false if there was nothing to delete
    async fn delete_like(&self, edge: LikeEdge) -> AppResult<bool>;

    /// Apply a vote action to a review
    ///
    /// Reading the current vote, writing the next one and moving the score
    /// must happen atomically with respect to other votes on the same review.
    async fn apply_vote(
        &self,
        review_id: ReviewId,
        user_id: UserId,
        action: VoteAction,
    ) -> AppResult<Review>;

    /// Reviews ordered by usefulness (desc), then id (asc)
    async fn reviews(&self, film_id: Option<FilmId>, limit: usize) -> AppResult<Vec<Review>>;
}
