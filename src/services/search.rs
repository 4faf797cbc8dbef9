use std::str::FromStr;
use std::sync::Arc;

use crate::{
    db::EntityStore,
    error::{AppError, AppResult},
    models::{DirectorId, Film, FilmId},
    services::{
        assembler::load_catalog,
        like_graph::{resolve, LikeGraph},
    },
};

/// Which film fields a text search looks at
///
/// Parsed from a comma-separated list such as `title,director`. At least one
/// field is always selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchFields {
    title: bool,
    director: bool,
}

impl SearchFields {
    pub const TITLE: Self = Self {
        title: true,
        director: false,
    };
    pub const DIRECTOR: Self = Self {
        title: false,
        director: true,
    };
    pub const BOTH: Self = Self {
        title: true,
        director: true,
    };

    /// Case-insensitive containment; selected fields are OR-ed
    fn matches(&self, film: &Film, needle: &str) -> bool {
        (self.title && film.title.to_lowercase().contains(needle))
            || (self.director
                && film
                    .directors
                    .iter()
                    .any(|d| d.name.to_lowercase().contains(needle)))
    }
}

impl FromStr for SearchFields {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = Self {
            title: false,
            director: false,
        };

        for token in s.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match token.to_lowercase().as_str() {
                "title" => fields.title = true,
                "director" => fields.director = true,
                other => {
                    return Err(AppError::InvalidInput(format!(
                        "Unknown search field '{}', expected title or director",
                        other
                    )))
                }
            }
        }

        if !fields.title && !fields.director {
            return Err(AppError::InvalidInput(
                "At least one search field is required".to_string(),
            ));
        }

        Ok(fields)
    }
}

/// Ordering for a director's filmography
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectorSort {
    /// Release date, oldest first
    Year,
    /// Like count, most liked first
    Likes,
}

impl FromStr for DirectorSort {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "year" => Ok(DirectorSort::Year),
            "likes" => Ok(DirectorSort::Likes),
            other => Err(AppError::InvalidInput(format!(
                "Unknown sort '{}', expected year or likes",
                other
            ))),
        }
    }
}

/// Text search and director listings ranked by likes
pub struct SearchService {
    store: Arc<dyn EntityStore>,
}

impl SearchService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Films whose selected fields contain `query`, most liked first
    pub async fn search(&self, query: &str, fields: SearchFields) -> AppResult<Vec<Film>> {
        let needle = query.to_lowercase();

        let catalog = load_catalog(self.store.as_ref()).await?;
        let graph = LikeGraph::load(self.store.as_ref()).await?;

        let ranked: Vec<FilmId> = graph
            .rank(catalog.iter().filter(|film| fields.matches(film, &needle)))
            .into_iter()
            .map(|film| film.id)
            .collect();

        tracing::debug!(
            query,
            fields = ?fields,
            matched = ranked.len(),
            "Film search"
        );

        Ok(resolve(catalog, &ranked))
    }

    /// Films of one director sorted by release year or by likes
    pub async fn director_films(
        &self,
        director_id: DirectorId,
        sort: DirectorSort,
    ) -> AppResult<Vec<Film>> {
        self.store.get_director(director_id).await?;

        let catalog = load_catalog(self.store.as_ref()).await?;
        let films = catalog
            .iter()
            .filter(|film| film.directors.iter().any(|d| d.id == director_id));

        let ordered: Vec<FilmId> = match sort {
            DirectorSort::Year => {
                let mut films: Vec<&Film> = films.collect();
                films.sort_by(|a, b| a.release_date.cmp(&b.release_date).then(a.id.cmp(&b.id)));
                films.into_iter().map(|film| film.id).collect()
            }
            DirectorSort::Likes => {
                let graph = LikeGraph::load(self.store.as_ref()).await?;
                graph.rank(films).into_iter().map(|film| film.id).collect()
            }
        };

        Ok(resolve(catalog, &ordered))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, MockEntityStore};
    use crate::models::Director;
    use crate::services::test_support::{film, seed_likes, seeded_store, user, with_directors};
    use tokio_test::{assert_err, assert_ok};

    fn titles(films: &[Film]) -> Vec<&str> {
        films.iter().map(|f| f.title.as_str()).collect()
    }

    #[test]
    fn test_parse_fields() {
        assert_eq!(assert_ok!("title".parse::<SearchFields>()), SearchFields::TITLE);
        assert_eq!(
            assert_ok!("director".parse::<SearchFields>()),
            SearchFields::DIRECTOR
        );
        assert_eq!(
            assert_ok!("director, Title".parse::<SearchFields>()),
            SearchFields::BOTH
        );
    }

    #[test]
    fn test_parse_fields_rejects_empty_and_unknown() {
        assert_err!("".parse::<SearchFields>());
        assert_err!(" , ".parse::<SearchFields>());
        assert_err!("title,genre".parse::<SearchFields>());
    }

    #[test]
    fn test_parse_director_sort() {
        assert_eq!(assert_ok!("year".parse::<DirectorSort>()), DirectorSort::Year);
        assert_eq!(assert_ok!("LIKES".parse::<DirectorSort>()), DirectorSort::Likes);
        assert_err!("rating".parse::<DirectorSort>());
    }

    async fn matrix_store() -> Arc<MemoryStore> {
        let store = seeded_store(
            vec![
                with_directors(film(1, "The Matrix", 1999), &[(1, "Lana Wachowski")]),
                with_directors(film(2, "matrix reloaded", 2003), &[(1, "Lana Wachowski")]),
                with_directors(film(3, "Inception", 2010), &[(2, "Christopher Nolan")]),
                film(4, "Unrelated", 2015),
            ],
            (1..=9).map(user).collect(),
        )
        .await;

        seed_likes(
            &store,
            &[
                (1, &[1, 2, 3]),
                (2, &[1, 2, 3]),
                (3, &[1, 3]),
                (4, &[1, 3]),
                (5, &[1, 3]),
                (6, &[3]),
                (7, &[3]),
                (8, &[3]),
                (9, &[3]),
            ],
        )
        .await;
        store
    }

    #[tokio::test]
    async fn test_title_search_is_case_insensitive_and_ranked() {
        let service = SearchService::new(matrix_store().await);

        let films = service.search("Matrix", SearchFields::TITLE).await.unwrap();
        assert_eq!(titles(&films), vec!["The Matrix", "matrix reloaded"]);
    }

    #[tokio::test]
    async fn test_director_search() {
        let service = SearchService::new(matrix_store().await);

        let films = service.search("nolan", SearchFields::DIRECTOR).await.unwrap();
        assert_eq!(titles(&films), vec!["Inception"]);
    }

    #[tokio::test]
    async fn test_both_fields_are_or_ed() {
        let service = SearchService::new(matrix_store().await);

        let films = service.search("ion", SearchFields::BOTH).await.unwrap();
        assert_eq!(titles(&films), vec!["Inception"]);

        let films = service.search("wachowski", SearchFields::BOTH).await.unwrap();
        assert_eq!(titles(&films), vec!["The Matrix", "matrix reloaded"]);

        // Director match for all three, ranked by likes
        let films = service.search("an", SearchFields::BOTH).await.unwrap();
        assert_eq!(
            titles(&films),
            vec!["Inception", "The Matrix", "matrix reloaded"]
        );
    }

    #[tokio::test]
    async fn test_unliked_films_sort_last() {
        let service = SearchService::new(matrix_store().await);

        let films = service.search("", SearchFields::TITLE).await.unwrap();
        assert_eq!(films.last().map(|f| f.id), Some(4));
        assert_eq!(films.len(), 4);
    }

    #[tokio::test]
    async fn test_director_films_by_year_and_likes() {
        let store = seeded_store(
            vec![
                with_directors(film(1, "Late", 2010), &[(5, "Ridley Scott")]),
                with_directors(film(2, "Early", 1979), &[(5, "Ridley Scott")]),
                with_directors(film(3, "Middle", 2000), &[(5, "Ridley Scott")]),
                with_directors(film(4, "Other", 1990), &[(6, "Someone Else")]),
            ],
            vec![user(1), user(2)],
        )
        .await;
        seed_likes(&store, &[(1, &[1, 3]), (2, &[3])]).await;
        let service = SearchService::new(store);

        let by_year = service.director_films(5, DirectorSort::Year).await.unwrap();
        assert_eq!(titles(&by_year), vec!["Early", "Middle", "Late"]);

        let by_likes = service.director_films(5, DirectorSort::Likes).await.unwrap();
        assert_eq!(titles(&by_likes), vec!["Middle", "Late", "Early"]);
    }

    #[tokio::test]
    async fn test_director_without_films() {
        let store = matrix_store().await;
        store
            .add_director(Director {
                id: 9,
                name: "Agnes Varda".to_string(),
            })
            .await;
        let service = SearchService::new(store);

        for sort in [DirectorSort::Year, DirectorSort::Likes] {
            assert!(service.director_films(9, sort).await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_equal_likes_keep_id_order() {
        let store = seeded_store(
            vec![
                film(5, "Night Train", 1990),
                film(2, "Night Moves", 1975),
                film(9, "Night Shift", 1982),
            ],
            vec![user(1)],
        )
        .await;
        seed_likes(&store, &[(1, &[9])]).await;
        let service = SearchService::new(store);

        let films = service.search("night", SearchFields::TITLE).await.unwrap();
        assert_eq!(films.iter().map(|f| f.id).collect::<Vec<_>>(), vec![9, 2, 5]);
    }

    #[tokio::test]
    async fn test_director_films_unknown_director() {
        let mut store = MockEntityStore::new();
        store
            .expect_get_director()
            .returning(|id| Err(AppError::NotFound(format!("Director {} does not exist", id))));
        store.expect_film_rows().never();

        let service = SearchService::new(Arc::new(store));
        let result = service.director_films(3, DirectorSort::Year).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
