use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{DirectorId, FilmId, GenreId, MpaId};

/// Film genre reference data
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

/// Film director reference data
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Director {
    pub id: DirectorId,
    pub name: String,
}

/// MPA age rating (G, PG, PG-13, R, NC-17)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mpa {
    pub id: MpaId,
    pub name: String,
}

/// A film aggregate with its resolved genres and directors
///
/// Sets are ordered by identifier so the serialized form is stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Film {
    pub id: FilmId,
    pub title: String,
    pub description: String,
    pub release_date: NaiveDate,
    /// Running time in minutes
    pub duration: i32,
    pub mpa: Mpa,
    pub genres: BTreeSet<Genre>,
    pub directors: BTreeSet<Director>,
}

impl Film {
    pub fn release_year(&self) -> i32 {
        use chrono::Datelike;
        self.release_date.year()
    }

    pub fn has_genre(&self, genre_id: GenreId) -> bool {
        self.genres.iter().any(|g| g.id == genre_id)
    }
}

/// One flat row of the films ⋈ mpa ⋈ genres ⋈ directors LEFT JOIN
///
/// A film with several genres and several directors produces one row per
/// (genre, director) combination. Absent references are `NULL` or `0`.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct FilmRow {
    pub id: FilmId,
    pub title: String,
    pub description: String,
    pub release_date: NaiveDate,
    pub duration: i32,
    pub mpa_id: MpaId,
    pub mpa_name: String,
    pub genre_id: Option<GenreId>,
    pub genre_name: Option<String>,
    pub director_id: Option<DirectorId>,
    pub director_name: Option<String>,
}

impl FilmRow {
    /// Genre carried by this row, if any
    pub fn genre(&self) -> Option<Genre> {
        match (self.genre_id, &self.genre_name) {
            (Some(id), Some(name)) if id != 0 => Some(Genre {
                id,
                name: name.clone(),
            }),
            _ => None,
        }
    }

    /// Director carried by this row, if any
    pub fn director(&self) -> Option<Director> {
        match (self.director_id, &self.director_name) {
            (Some(id), Some(name)) if id != 0 => Some(Director {
                id,
                name: name.clone(),
            }),
            _ => None,
        }
    }

    /// Film aggregate with empty genre and director sets
    pub fn to_bare_film(&self) -> Film {
        Film {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            release_date: self.release_date,
            duration: self.duration,
            mpa: Mpa {
                id: self.mpa_id,
                name: self.mpa_name.clone(),
            },
            genres: BTreeSet::new(),
            directors: BTreeSet::new(),
        }
    }
}
