use serde::{Deserialize, Serialize};

pub mod event;
pub mod film;
pub mod review;
pub mod user;

pub use event::{Event, EventType, Operation};
pub use film::{Director, Film, FilmRow, Genre, Mpa};
pub use review::{Review, VoteKind};
pub use user::User;

pub type FilmId = i64;
pub type UserId = i64;
pub type ReviewId = i64;
pub type GenreId = i64;
pub type DirectorId = i64;
pub type MpaId = i64;

/// A user→film like edge
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::FromRow,
)]
pub struct LikeEdge {
    pub film_id: FilmId,
    pub user_id: UserId,
}

impl LikeEdge {
    pub fn new(film_id: FilmId, user_id: UserId) -> Self {
        Self { film_id, user_id }
    }
}
