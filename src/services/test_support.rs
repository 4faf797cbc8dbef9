use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::db::MemoryStore;
use crate::models::{Director, Film, FilmId, Genre, Mpa, Review, ReviewId, User, UserId};

pub fn film(id: FilmId, title: &str, year: i32) -> Film {
    Film {
        id,
        title: title.to_string(),
        description: format!("{} description", title),
        release_date: NaiveDate::from_ymd_opt(year, 6, 1).unwrap(),
        duration: 120,
        mpa: Mpa {
            id: 1,
            name: "G".to_string(),
        },
        genres: BTreeSet::new(),
        directors: BTreeSet::new(),
    }
}

pub fn with_genres(mut film: Film, genres: &[(i64, &str)]) -> Film {
    film.genres = genres
        .iter()
        .map(|(id, name)| Genre {
            id: *id,
            name: name.to_string(),
        })
        .collect();
    film
}

pub fn with_directors(mut film: Film, directors: &[(i64, &str)]) -> Film {
    film.directors = directors
        .iter()
        .map(|(id, name)| Director {
            id: *id,
            name: name.to_string(),
        })
        .collect();
    film
}

pub fn user(id: UserId) -> User {
    User {
        id,
        email: format!("user{}@example.com", id),
        login: format!("user{}", id),
        name: format!("User {}", id),
        birthday: None,
    }
}

pub fn review(id: ReviewId, user_id: UserId, film_id: FilmId) -> Review {
    Review {
        id,
        user_id,
        film_id,
        is_positive: true,
        content: format!("Review {}", id),
        useful: 0,
    }
}

pub async fn seeded_store(films: Vec<Film>, users: Vec<User>) -> Arc<MemoryStore> {
    let store = MemoryStore::new();
    for film in films {
        store.add_film(film).await;
    }
    for user in users {
        store.add_user(user).await;
    }
    Arc::new(store)
}

/// Seeds likes directly, bypassing validation
pub async fn seed_likes(store: &MemoryStore, likes: &[(UserId, &[FilmId])]) {
    use crate::db::EntityStore;
    use crate::models::LikeEdge;

    for (user_id, film_ids) in likes {
        for film_id in film_ids.iter() {
            store
                .insert_like(LikeEdge::new(*film_id, *user_id))
                .await
                .unwrap();
        }
    }
}
