use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::{
    db::{EntityStore, EventFeed},
    error::AppResult,
    models::{EventType, Film, FilmId, GenreId, LikeEdge, Operation, UserId},
    services::{assembler::load_catalog, validate_limit},
};

pub const DEFAULT_POPULAR_LIMIT: usize = 10;

/// Filters for the popularity ranking; both filters intersect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopularQuery {
    pub limit: usize,
    pub genre_id: Option<GenreId>,
    pub year: Option<i32>,
}

impl Default for PopularQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_POPULAR_LIMIT,
            genre_id: None,
            year: None,
        }
    }
}

impl PopularQuery {
    fn matches(&self, film: &Film) -> bool {
        self.genre_id.map_or(true, |genre_id| film.has_genre(genre_id))
            && self.year.map_or(true, |year| film.release_year() == year)
    }
}

/// Snapshot of the user→film like graph
#[derive(Debug, Default, Clone)]
pub struct LikeGraph {
    by_user: HashMap<UserId, BTreeSet<FilmId>>,
    counts: HashMap<FilmId, usize>,
}

impl LikeGraph {
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = LikeEdge>,
    {
        let mut graph = Self::default();
        for edge in edges {
            if graph
                .by_user
                .entry(edge.user_id)
                .or_default()
                .insert(edge.film_id)
            {
                *graph.counts.entry(edge.film_id).or_default() += 1;
            }
        }
        graph
    }

    /// Scan the store's like edges into a graph
    pub async fn load(store: &dyn EntityStore) -> AppResult<Self> {
        let edges = store.like_edges().await?;
        tracing::debug!(edge_count = edges.len(), "Loaded like graph");
        Ok(Self::from_edges(edges))
    }

    pub fn like_count(&self, film_id: FilmId) -> usize {
        self.counts.get(&film_id).copied().unwrap_or(0)
    }

    pub fn liked_films(&self, user_id: UserId) -> BTreeSet<FilmId> {
        self.by_user.get(&user_id).cloned().unwrap_or_default()
    }

    /// User sharing the most liked films with `user_id`
    ///
    /// Ties go to the lowest user id. Users with no overlap never qualify.
    pub fn most_similar_user(&self, user_id: UserId) -> Option<UserId> {
        let mine = self.by_user.get(&user_id)?;
        let mut best: Option<(usize, UserId)> = None;

        for (&other, theirs) in &self.by_user {
            if other == user_id {
                continue;
            }
            let overlap = theirs.intersection(mine).count();
            if overlap == 0 {
                continue;
            }
            best = match best {
                Some((count, id)) if count > overlap || (count == overlap && id < other) => {
                    Some((count, id))
                }
                _ => Some((overlap, other)),
            };
        }

        best.map(|(_, id)| id)
    }

    /// Sort films by like count (desc), then film id (asc)
    pub fn rank<'a, I>(&self, films: I) -> Vec<&'a Film>
    where
        I: IntoIterator<Item = &'a Film>,
    {
        let mut ranked: Vec<&Film> = films.into_iter().collect();
        ranked.sort_by(|a, b| {
            self.like_count(b.id)
                .cmp(&self.like_count(a.id))
                .then(a.id.cmp(&b.id))
        });
        ranked
    }

    /// Ids of the most liked films passing the query's filters
    pub fn popular(&self, catalog: &[Film], query: &PopularQuery) -> Vec<FilmId> {
        self.rank(catalog.iter().filter(|film| query.matches(film)))
            .into_iter()
            .take(query.limit)
            .map(|film| film.id)
            .collect()
    }
}

/// Like mutations and like-driven rankings
pub struct LikeService {
    store: Arc<dyn EntityStore>,
    feed: Arc<dyn EventFeed>,
    default_limit: usize,
}

impl LikeService {
    pub fn new(store: Arc<dyn EntityStore>, feed: Arc<dyn EventFeed>) -> Self {
        Self {
            store,
            feed,
            default_limit: DEFAULT_POPULAR_LIMIT,
        }
    }

    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    /// Record that a user likes a film
    ///
    /// Both film and user must exist before the edge is written.
    pub async fn add_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<()> {
        self.store.get_film(film_id).await?;
        self.store.get_user(user_id).await?;

        let created = self.store.insert_like(LikeEdge::new(film_id, user_id)).await?;
        tracing::info!(film_id, user_id, created, "Like added");

        self.feed
            .record(user_id, film_id, EventType::Like, Operation::Add)
            .await;
        Ok(())
    }

    /// Withdraw a like; a missing edge is not an error
    pub async fn remove_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<()> {
        self.store.get_film(film_id).await?;
        self.store.get_user(user_id).await?;

        let removed = self.store.delete_like(LikeEdge::new(film_id, user_id)).await?;
        tracing::info!(film_id, user_id, removed, "Like removed");

        self.feed
            .record(user_id, film_id, EventType::Like, Operation::Remove)
            .await;
        Ok(())
    }

    /// Most liked films, optionally restricted to a genre and/or release year
    pub async fn popular_films(
        &self,
        count: Option<i64>,
        genre_id: Option<GenreId>,
        year: Option<i32>,
    ) -> AppResult<Vec<Film>> {
        let limit = match count {
            Some(count) => validate_limit(count, "count")?,
            None => self.default_limit,
        };
        let query = PopularQuery {
            limit,
            genre_id,
            year,
        };

        if let Some(genre_id) = genre_id {
            self.store.get_genre(genre_id).await?;
        }

        let catalog = load_catalog(self.store.as_ref()).await?;
        let graph = LikeGraph::load(self.store.as_ref()).await?;
        let ranked = graph.popular(&catalog, &query);

        tracing::debug!(
            limit,
            genre_id = ?genre_id,
            year = ?year,
            returned = ranked.len(),
            "Ranked popular films"
        );

        Ok(resolve(catalog, &ranked))
    }

    /// Films liked by both users, most popular first
    pub async fn common_films(&self, user_id: UserId, friend_id: UserId) -> AppResult<Vec<Film>> {
        self.store.get_user(user_id).await?;
        self.store.get_user(friend_id).await?;

        let graph = LikeGraph::load(self.store.as_ref()).await?;
        let shared: BTreeSet<FilmId> = graph
            .liked_films(user_id)
            .intersection(&graph.liked_films(friend_id))
            .copied()
            .collect();
        if shared.is_empty() {
            return Ok(Vec::new());
        }

        let catalog = load_catalog(self.store.as_ref()).await?;
        let ranked: Vec<FilmId> = graph
            .rank(catalog.iter().filter(|film| shared.contains(&film.id)))
            .into_iter()
            .map(|film| film.id)
            .collect();

        Ok(resolve(catalog, &ranked))
    }
}

/// Pick films out of the catalog in the order given by `ids`
pub(crate) fn resolve(catalog: Vec<Film>, ids: &[FilmId]) -> Vec<Film> {
    let mut by_id: HashMap<FilmId, Film> = catalog.into_iter().map(|f| (f.id, f)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}
