use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::{
        Director, DirectorId, Film, FilmId, FilmRow, Genre, GenreId, LikeEdge, Mpa, MpaId, Review,
        ReviewId, User, UserId, VoteKind,
    },
    services::{
        assembler::assemble_films,
        review_scoring::{transition, VoteAction},
    },
};

use super::EntityStore;

/// Film scalars as stored in the `films` table
#[derive(Debug, Clone)]
struct FilmRecord {
    title: String,
    description: String,
    release_date: NaiveDate,
    duration: i32,
    mpa_id: MpaId,
}

#[derive(Default)]
struct Tables {
    films: BTreeMap<FilmId, FilmRecord>,
    mpa: HashMap<MpaId, Mpa>,
    genres: HashMap<GenreId, Genre>,
    directors: HashMap<DirectorId, Director>,
    film_genres: BTreeSet<(FilmId, GenreId)>,
    film_directors: BTreeSet<(FilmId, DirectorId)>,
    users: HashMap<UserId, User>,
    likes: BTreeSet<LikeEdge>,
    reviews: BTreeMap<ReviewId, Review>,
    review_votes: HashMap<(ReviewId, UserId), VoteKind>,
}

impl Tables {
    /// Rows of films ⋈ mpa ⟕ genres ⟕ directors for one film
    fn joined_rows(&self, film_id: FilmId, record: &FilmRecord) -> Vec<FilmRow> {
        let mpa_name = self
            .mpa
            .get(&record.mpa_id)
            .map(|m| m.name.clone())
            .unwrap_or_default();

        let genres = linked(&self.film_genres, film_id, &self.genres);
        let directors = linked(&self.film_directors, film_id, &self.directors);

        let mut rows = Vec::with_capacity(genres.len() * directors.len());
        for genre in genres.iter().copied() {
            for director in directors.iter().copied() {
                rows.push(FilmRow {
                    id: film_id,
                    title: record.title.clone(),
                    description: record.description.clone(),
                    release_date: record.release_date,
                    duration: record.duration,
                    mpa_id: record.mpa_id,
                    mpa_name: mpa_name.clone(),
                    genre_id: genre.map(|g| g.id),
                    genre_name: genre.map(|g| g.name.clone()),
                    director_id: director.map(|d| d.id),
                    director_name: director.map(|d| d.name.clone()),
                });
            }
        }
        rows
    }
}

/// Left-join semantics: a film without links still yields a single `None`
fn linked<'a, T>(
    links: &BTreeSet<(FilmId, i64)>,
    film_id: FilmId,
    table: &'a HashMap<i64, T>,
) -> Vec<Option<&'a T>> {
    let found: Vec<Option<&'a T>> = links
        .range((film_id, i64::MIN)..=(film_id, i64::MAX))
        .filter_map(|(_, id)| table.get(id))
        .map(Some)
        .collect();

    if found.is_empty() {
        vec![None]
    } else {
        found
    }
}

/// Entity Store held in process memory
///
/// Produces the same flat join rows as the PostgreSQL store, so films are
/// always rebuilt through the row assembler.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a film together with its MPA rating, genres and directors
    pub async fn add_film(&self, film: Film) {
        let mut tables = self.tables.write().await;

        tables.mpa.insert(film.mpa.id, film.mpa.clone());
        tables.film_genres.retain(|(film_id, _)| *film_id != film.id);
        tables.film_directors.retain(|(film_id, _)| *film_id != film.id);

        for genre in film.genres {
            tables.film_genres.insert((film.id, genre.id));
            tables.genres.insert(genre.id, genre);
        }
        for director in film.directors {
            tables.film_directors.insert((film.id, director.id));
            tables.directors.insert(director.id, director);
        }

        tables.films.insert(
            film.id,
            FilmRecord {
                title: film.title,
                description: film.description,
                release_date: film.release_date,
                duration: film.duration,
                mpa_id: film.mpa.id,
            },
        );
    }

    pub async fn add_user(&self, user: User) {
        self.tables.write().await.users.insert(user.id, user);
    }

    pub async fn add_review(&self, review: Review) {
        self.tables.write().await.reviews.insert(review.id, review);
    }

    pub async fn add_genre(&self, genre: Genre) {
        self.tables.write().await.genres.insert(genre.id, genre);
    }

    pub async fn add_director(&self, director: Director) {
        self.tables
            .write()
            .await
            .directors
            .insert(director.id, director);
    }
}

#[async_trait::async_trait]
impl EntityStore for MemoryStore {
    async fn get_film(&self, id: FilmId) -> AppResult<Film> {
        let tables = self.tables.read().await;
        let record = tables
            .films
            .get(&id)
            .ok_or_else(|| AppError::film_not_found(id))?;

        assemble_films(tables.joined_rows(id, record))
            .pop()
            .ok_or_else(|| AppError::film_not_found(id))
    }

    async fn get_user(&self, id: UserId) -> AppResult<User> {
        self.tables
            .read()
            .await
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::user_not_found(id))
    }

    async fn get_review(&self, id: ReviewId) -> AppResult<Review> {
        self.tables
            .read()
            .await
            .reviews
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::review_not_found(id))
    }

    async fn get_genre(&self, id: GenreId) -> AppResult<Genre> {
        self.tables
            .read()
            .await
            .genres
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Genre {} does not exist", id)))
    }

    async fn get_director(&self, id: DirectorId) -> AppResult<Director> {
        self.tables
            .read()
            .await
            .directors
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Director {} does not exist", id)))
    }

    async fn film_rows(&self) -> AppResult<Vec<FilmRow>> {
        let tables = self.tables.read().await;
        Ok(tables
            .films
            .iter()
            .flat_map(|(id, record)| tables.joined_rows(*id, record))
            .collect())
    }

    async fn like_edges(&self) -> AppResult<Vec<LikeEdge>> {
        Ok(self.tables.read().await.likes.iter().copied().collect())
    }

    async fn insert_like(&self, edge: LikeEdge) -> AppResult<bool> {
        Ok(self.tables.write().await.likes.insert(edge))
    }

    async fn delete_like(&self, edge: LikeEdge) -> AppResult<bool> {
        Ok(self.tables.write().await.likes.remove(&edge))
    }

    async fn apply_vote(
        &self,
        review_id: ReviewId,
        user_id: UserId,
        action: VoteAction,
    ) -> AppResult<Review> {
        // One write guard covers read, transition and both writes
        let mut tables = self.tables.write().await;
        if !tables.reviews.contains_key(&review_id) {
            return Err(AppError::review_not_found(review_id));
        }

        let key = (review_id, user_id);
        let current = tables.review_votes.get(&key).copied();
        let step = transition(current, action);

        match step.next {
            Some(kind) => {
                tables.review_votes.insert(key, kind);
            }
            None => {
                tables.review_votes.remove(&key);
            }
        }

        let review = tables
            .reviews
            .get_mut(&review_id)
            .ok_or_else(|| AppError::review_not_found(review_id))?;
        review.useful += step.delta;

        Ok(review.clone())
    }

    async fn reviews(&self, film_id: Option<FilmId>, limit: usize) -> AppResult<Vec<Review>> {
        let tables = self.tables.read().await;
        let mut reviews: Vec<Review> = tables
            .reviews
            .values()
            .filter(|r| film_id.map_or(true, |id| r.film_id == id))
            .cloned()
            .collect();

        reviews.sort_by(|a, b| b.useful.cmp(&a.useful).then(a.id.cmp(&b.id)));
        reviews.truncate(limit);
        Ok(reviews)
    }
}
