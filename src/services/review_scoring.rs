use std::sync::Arc;

use crate::{
    db::EntityStore,
    error::AppResult,
    models::{FilmId, Review, ReviewId, UserId, VoteKind},
    services::validate_limit,
};

/// What a user asks to do with their vote on a review
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteAction {
    Like,
    Dislike,
    RemoveLike,
    RemoveDislike,
}

/// Outcome of applying a [`VoteAction`] to the current vote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Vote stored after the action
    pub next: Option<VoteKind>,
    /// Amount added to the review's usefulness score
    pub delta: i64,
}

impl Transition {
    fn to(next: Option<VoteKind>, delta: i64) -> Self {
        Self { next, delta }
    }

    #[cfg(test)]
    fn is_noop(&self, current: Option<VoteKind>) -> bool {
        self.delta == 0 && self.next == current
    }
}

/// Vote state machine for a single (review, user) pair
///
/// Switching polarity moves the score by two because the old vote is
/// withdrawn and the new one cast in the same step. Repeating the current
/// vote, or removing a vote the user does not hold, leaves everything as is.
pub fn transition(current: Option<VoteKind>, action: VoteAction) -> Transition {
    use VoteKind::{Dislike, Like};

    match (current, action) {
        (None, VoteAction::Like) => Transition::to(Some(Like), 1),
        (None, VoteAction::Dislike) => Transition::to(Some(Dislike), -1),
        (Some(Dislike), VoteAction::Like) => Transition::to(Some(Like), 2),
        (Some(Like), VoteAction::Dislike) => Transition::to(Some(Dislike), -2),
        (Some(Like), VoteAction::RemoveLike) => Transition::to(None, -1),
        (Some(Dislike), VoteAction::RemoveDislike) => Transition::to(None, 1),
        (current, _) => Transition::to(current, 0),
    }
}

pub const DEFAULT_REVIEW_LIMIT: usize = 10;

/// Review usefulness scoring
pub struct ReviewScoringService {
    store: Arc<dyn EntityStore>,
    default_limit: usize,
}

impl ReviewScoringService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            store,
            default_limit: DEFAULT_REVIEW_LIMIT,
        }
    }

    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    pub async fn like(&self, review_id: ReviewId, user_id: UserId) -> AppResult<Review> {
        self.vote(review_id, user_id, VoteAction::Like).await
    }

    pub async fn dislike(&self, review_id: ReviewId, user_id: UserId) -> AppResult<Review> {
        self.vote(review_id, user_id, VoteAction::Dislike).await
    }

    pub async fn remove_like(&self, review_id: ReviewId, user_id: UserId) -> AppResult<Review> {
        self.vote(review_id, user_id, VoteAction::RemoveLike).await
    }

    pub async fn remove_dislike(&self, review_id: ReviewId, user_id: UserId) -> AppResult<Review> {
        self.vote(review_id, user_id, VoteAction::RemoveDislike).await
    }

    /// Validates both parties, then hands the transition to the store
    pub async fn vote(
        &self,
        review_id: ReviewId,
        user_id: UserId,
        action: VoteAction,
    ) -> AppResult<Review> {
        self.store.get_user(user_id).await?;
        self.store.get_review(review_id).await?;

        let review = self.store.apply_vote(review_id, user_id, action).await?;

        tracing::info!(
            review_id,
            user_id,
            action = ?action,
            useful = review.useful,
            "Review vote applied"
        );

        Ok(review)
    }

    /// Most useful reviews, optionally restricted to one film
    pub async fn top_reviews(
        &self,
        film_id: Option<FilmId>,
        count: Option<i64>,
    ) -> AppResult<Vec<Review>> {
        let limit = match count {
            Some(count) => validate_limit(count, "count")?,
            None => self.default_limit,
        };

        if let Some(film_id) = film_id {
            self.store.get_film(film_id).await?;
        }

        self.store.reviews(film_id, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, MockEntityStore};
    use crate::error::AppError;
    use crate::services::test_support::{film, review, seeded_store, user};

    #[test]
    fn test_transition_table() {
        use VoteKind::{Dislike, Like};

        let cases = [
            (None, VoteAction::Like, Some(Like), 1),
            (None, VoteAction::Dislike, Some(Dislike), -1),
            (Some(Dislike), VoteAction::Like, Some(Like), 2),
            (Some(Like), VoteAction::Dislike, Some(Dislike), -2),
            (Some(Like), VoteAction::RemoveLike, None, -1),
            (Some(Dislike), VoteAction::RemoveDislike, None, 1),
        ];

        for (from, action, next, delta) in cases {
            assert_eq!(
                transition(from, action),
                Transition { next, delta },
                "{:?} + {:?}",
                from,
                action
            );
        }
    }

    #[test]
    fn test_repeated_vote_is_noop() {
        let t = transition(Some(VoteKind::Like), VoteAction::Like);
        assert!(t.is_noop(Some(VoteKind::Like)));

        let t = transition(Some(VoteKind::Dislike), VoteAction::Dislike);
        assert!(t.is_noop(Some(VoteKind::Dislike)));
    }

    #[test]
    fn test_removing_absent_vote_is_noop() {
        assert!(transition(None, VoteAction::RemoveLike).is_noop(None));
        assert!(transition(None, VoteAction::RemoveDislike).is_noop(None));
        assert!(transition(Some(VoteKind::Dislike), VoteAction::RemoveLike)
            .is_noop(Some(VoteKind::Dislike)));
        assert!(transition(Some(VoteKind::Like), VoteAction::RemoveDislike)
            .is_noop(Some(VoteKind::Like)));
    }

    #[test]
    fn test_like_dislike_remove_trajectory() {
        let mut vote = None;
        let mut score = 0;
        let mut trajectory = vec![score];

        for action in [
            VoteAction::Like,
            VoteAction::Dislike,
            VoteAction::RemoveDislike,
        ] {
            let t = transition(vote, action);
            vote = t.next;
            score += t.delta;
            trajectory.push(score);
        }

        assert_eq!(trajectory, vec![0, 1, -1, 0]);
        assert_eq!(vote, None);
    }

    #[test]
    fn test_double_toggle_cancels() {
        let start = transition(None, VoteAction::Like);
        let first = transition(start.next, VoteAction::Dislike);
        let second = transition(first.next, VoteAction::Like);

        assert_eq!(first.delta + second.delta, 0);
        assert_eq!(second.next, start.next);
    }

    async fn scoring_fixture() -> (Arc<MemoryStore>, ReviewScoringService) {
        let store = seeded_store(vec![film(1, "Alien", 1979)], vec![user(1), user(2), user(3)]).await;
        store.add_review(review(1, 1, 1)).await;
        let service = ReviewScoringService::new(store.clone());
        (store, service)
    }

    #[tokio::test]
    async fn test_votes_from_several_users_accumulate() {
        let (_store, service) = scoring_fixture().await;

        service.like(1, 1).await.unwrap();
        service.like(1, 2).await.unwrap();
        let review = service.dislike(1, 3).await.unwrap();

        assert_eq!(review.useful, 1);
    }

    #[tokio::test]
    async fn test_toggle_moves_score_by_two() {
        let (store, service) = scoring_fixture().await;

        service.dislike(1, 2).await.unwrap();
        let review = service.like(1, 2).await.unwrap();
        assert_eq!(review.useful, 1);

        let review = service.remove_like(1, 2).await.unwrap();
        assert_eq!(review.useful, 0);
        assert_eq!(store.get_review(1).await.unwrap().useful, 0);
    }

    #[tokio::test]
    async fn test_repeated_like_counts_once() {
        let (_store, service) = scoring_fixture().await;

        service.like(1, 2).await.unwrap();
        let review = service.like(1, 2).await.unwrap();
        assert_eq!(review.useful, 1);
    }

    #[tokio::test]
    async fn test_vote_on_missing_review_is_not_found() {
        let (_store, service) = scoring_fixture().await;

        let result = service.like(99, 1).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_vote_by_missing_user_never_touches_votes() {
        let mut store = MockEntityStore::new();
        store
            .expect_get_user()
            .returning(|id| Err(AppError::user_not_found(id)));
        store.expect_get_review().never();
        store.expect_apply_vote().never();

        let service = ReviewScoringService::new(Arc::new(store));
        let result = service.dislike(1, 42).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_top_reviews_ordered_by_usefulness() {
        let (store, service) = scoring_fixture().await;
        store.add_review(review(2, 2, 1)).await;
        store.add_review(review(3, 3, 1)).await;

        service.like(3, 1).await.unwrap();
        service.like(3, 2).await.unwrap();
        service.dislike(1, 2).await.unwrap();

        let ids: Vec<ReviewId> = service
            .top_reviews(Some(1), Some(10))
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![3, 2, 1]);

        let top = service.top_reviews(None, Some(1)).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].id, 3);
    }

    #[tokio::test]
    async fn test_top_reviews_rejects_non_positive_count() {
        let (_store, service) = scoring_fixture().await;

        let result = service.top_reviews(None, Some(0)).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_top_reviews_for_missing_film() {
        let (_store, service) = scoring_fixture().await;

        let result = service.top_reviews(Some(404), None).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_top_reviews_default_limit() {
        let (store, _service) = scoring_fixture().await;
        for id in 2..=4 {
            store.add_review(review(id, 1, 1)).await;
        }

        let service = ReviewScoringService::new(store.clone()).with_default_limit(2);
        assert_eq!(service.top_reviews(None, None).await.unwrap().len(), 2);

        let service = ReviewScoringService::new(store);
        assert_eq!(service.top_reviews(None, None).await.unwrap().len(), 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_votes_are_not_lost() {
        const VOTERS: i64 = 200;

        let store = seeded_store(vec![film(1, "Alien", 1979)], (1..=VOTERS).map(user).collect()).await;
        store.add_review(review(1, 1, 1)).await;
        let service = Arc::new(ReviewScoringService::new(store.clone()));

        let handles: Vec<_> = (1..=VOTERS)
            .map(|user_id| {
                let service = service.clone();
                tokio::spawn(async move {
                    service.dislike(1, user_id).await.unwrap();
                    service.like(1, user_id).await.unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.get_review(1).await.unwrap().useful, VOTERS);
    }
}
