use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    error::{AppError, AppResult},
    models::{
        Director, DirectorId, Film, FilmId, FilmRow, Genre, GenreId, LikeEdge, Review, ReviewId,
        User, UserId, VoteKind,
    },
    services::{
        assembler::assemble_films,
        review_scoring::{transition, VoteAction},
    },
};

use super::EntityStore;

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Film joined with its MPA rating, genres and directors
///
/// One row per (genre, director) pair; missing links come back as NULL.
const FILM_ROWS_SQL: &str = r#"
    SELECT f.id, f.title, f.description, f.release_date, f.duration,
           m.id AS mpa_id, m.name AS mpa_name,
           g.id AS genre_id, g.name AS genre_name,
           d.id AS director_id, d.name AS director_name
    FROM films f
    JOIN mpa m ON f.mpa_id = m.id
    LEFT JOIN film_genres fg ON f.id = fg.film_id
    LEFT JOIN genres g ON fg.genre_id = g.id
    LEFT JOIN film_directors fd ON f.id = fd.film_id
    LEFT JOIN directors d ON fd.director_id = d.id
"#;

const REVIEW_COLUMNS: &str = "id, user_id, film_id, is_positive, content, useful";

/// Entity Store backed by PostgreSQL
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl EntityStore for PgStore {
    async fn get_film(&self, id: FilmId) -> AppResult<Film> {
        let rows = sqlx::query_as::<_, FilmRow>(&format!("{} WHERE f.id = $1", FILM_ROWS_SQL))
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        assemble_films(rows)
            .pop()
            .ok_or_else(|| AppError::film_not_found(id))
    }

    async fn get_user(&self, id: UserId) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, login, name, birthday
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::user_not_found(id))
    }

    async fn get_review(&self, id: ReviewId) -> AppResult<Review> {
        sqlx::query_as::<_, Review>(&format!(
            "SELECT {} FROM reviews WHERE id = $1",
            REVIEW_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::review_not_found(id))
    }

    async fn get_genre(&self, id: GenreId) -> AppResult<Genre> {
        let row: Option<(GenreId, String)> =
            sqlx::query_as("SELECT id, name FROM genres WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(id, name)| Genre { id, name })
            .ok_or_else(|| AppError::NotFound(format!("Genre {} does not exist", id)))
    }

    async fn get_director(&self, id: DirectorId) -> AppResult<Director> {
        let row: Option<(DirectorId, String)> =
            sqlx::query_as("SELECT id, name FROM directors WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(id, name)| Director { id, name })
            .ok_or_else(|| AppError::NotFound(format!("Director {} does not exist", id)))
    }

    async fn film_rows(&self) -> AppResult<Vec<FilmRow>> {
        let rows = sqlx::query_as::<_, FilmRow>(&format!("{} ORDER BY f.id", FILM_ROWS_SQL))
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(row_count = rows.len(), "Scanned film rows");
        Ok(rows)
    }

    async fn like_edges(&self) -> AppResult<Vec<LikeEdge>> {
        let edges = sqlx::query_as::<_, LikeEdge>("SELECT film_id, user_id FROM likes")
            .fetch_all(&self.pool)
            .await?;

        Ok(edges)
    }

    async fn insert_like(&self, edge: LikeEdge) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO likes (film_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (film_id, user_id) DO NOTHING
            "#,
        )
        .bind(edge.film_id)
        .bind(edge.user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_like(&self, edge: LikeEdge) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM likes
            WHERE film_id = $1 AND user_id = $2
            "#,
        )
        .bind(edge.film_id)
        .bind(edge.user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn apply_vote(
        &self,
        review_id: ReviewId,
        user_id: UserId,
        action: VoteAction,
    ) -> AppResult<Review> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent votes on the same review
        let locked: Option<i64> =
            sqlx::query_scalar("SELECT useful FROM reviews WHERE id = $1 FOR UPDATE")
                .bind(review_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(AppError::review_not_found(review_id));
        }

        let current: Option<bool> = sqlx::query_scalar(
            "SELECT is_like FROM review_votes WHERE review_id = $1 AND user_id = $2",
        )
        .bind(review_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
        let current = current.map(VoteKind::from_is_like);

        let step = transition(current, action);

        if step.next != current {
            match step.next {
                Some(kind) => {
                    sqlx::query(
                        r#"
                        INSERT INTO review_votes (review_id, user_id, is_like)
                        VALUES ($1, $2, $3)
                        ON CONFLICT (review_id, user_id) DO UPDATE
                        SET is_like = EXCLUDED.is_like
                        "#,
                    )
                    .bind(review_id)
                    .bind(user_id)
                    .bind(kind.is_like())
                    .execute(&mut *tx)
                    .await?;
                }
                None => {
                    sqlx::query("DELETE FROM review_votes WHERE review_id = $1 AND user_id = $2")
                        .bind(review_id)
                        .bind(user_id)
                        .execute(&mut *tx)
                        .await?;
                }
            }
        }

        if step.delta != 0 {
            sqlx::query("UPDATE reviews SET useful = useful + $1 WHERE id = $2")
                .bind(step.delta)
                .bind(review_id)
                .execute(&mut *tx)
                .await?;
        }

        let review = sqlx::query_as::<_, Review>(&format!(
            "SELECT {} FROM reviews WHERE id = $1",
            REVIEW_COLUMNS
        ))
        .bind(review_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(review)
    }

    async fn reviews(&self, film_id: Option<FilmId>, limit: usize) -> AppResult<Vec<Review>> {
        let limit = i64::try_from(limit)
            .map_err(|_| AppError::InvalidInput(format!("limit {} is too large", limit)))?;

        let reviews = sqlx::query_as::<_, Review>(&format!(
            r#"
            SELECT {}
            FROM reviews
            WHERE $1::BIGINT IS NULL OR film_id = $1
            ORDER BY useful DESC, id ASC
            LIMIT $2
            "#,
            REVIEW_COLUMNS
        ))
        .bind(film_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }
}
