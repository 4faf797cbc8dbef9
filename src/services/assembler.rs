use std::collections::HashMap;

use crate::{
    db::EntityStore,
    error::AppResult,
    models::{Film, FilmId, FilmRow},
};

/// Folds flat join rows into film aggregates
///
/// Joining a film against its genres and its directors independently yields
/// the cross product of both lists, so the same genre shows up once per
/// director and vice versa. Aggregates are kept in an arena indexed by film
/// id; genres and directors go into sets, which absorbs the duplicates.
///
/// The output preserves the order in which film ids are first seen, so an
/// `ORDER BY` on the query survives assembly.
pub fn assemble_films<I>(rows: I) -> Vec<Film>
where
    I: IntoIterator<Item = FilmRow>,
{
    let mut films: Vec<Film> = Vec::new();
    let mut index: HashMap<FilmId, usize> = HashMap::new();

    for row in rows {
        let slot = *index.entry(row.id).or_insert_with(|| {
            films.push(row.to_bare_film());
            films.len() - 1
        });

        let film = &mut films[slot];
        if let Some(genre) = row.genre() {
            film.genres.insert(genre);
        }
        if let Some(director) = row.director() {
            film.directors.insert(director);
        }
    }

    films
}

/// Scan and assemble the whole catalog, ordered by film id
pub async fn load_catalog(store: &dyn EntityStore) -> AppResult<Vec<Film>> {
    let films = assemble_films(store.film_rows().await?);
    tracing::debug!(film_count = films.len(), "Assembled film catalog");
    Ok(films)
}
