//! Diesel row structs and their conversions to domain entities.
//!
//! Rows never leave the persistence module. Conversions from rows are
//! fallible: a value the domain would reject maps to
//! [`GatewayError::Corrupt`].

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::ports::GatewayError;
use crate::domain::{
    AddingTask, Movie, MovieId, MovieSnapshot, MovieTitle, PasswordHash,
    RatingValue, User, UserId, UserMovieRating, UserSnapshot, Username,
};

use super::schema::{adding_tasks, movies, outbox_messages, user_movie_ratings, users};

fn corrupt(context: &str, error: impl std::fmt::Display) -> GatewayError {
    GatewayError::corrupt(format!("{context}: {error}"))
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub is_confirmed: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserRecord {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id().as_uuid(),
            username: user.username().as_ref().to_owned(),
            password_hash: user.password_hash().as_ref().to_owned(),
            is_confirmed: user.is_confirmed(),
            is_active: user.is_active(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        }
    }
}

impl TryFrom<UserRecord> for User {
    type Error = GatewayError;

    fn try_from(row: UserRecord) -> Result<Self, Self::Error> {
        let username = Username::new(&row.username).map_err(|err| corrupt("users.username", err))?;
        Ok(User::restore(UserSnapshot {
            id: UserId::from_uuid(row.id),
            username,
            password_hash: PasswordHash::new(row.password_hash),
            is_confirmed: row.is_confirmed,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = movies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MovieRecord {
    pub id: Uuid,
    pub title: String,
    pub rating_total: i64,
    pub rating_count: i64,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<&Movie> for MovieRecord {
    type Error = GatewayError;

    fn try_from(movie: &Movie) -> Result<Self, Self::Error> {
        Ok(Self {
            id: *movie.id().as_uuid(),
            title: movie.title().as_ref().to_owned(),
            rating_total: i64::try_from(movie.rating_total())
                .map_err(|err| corrupt("movies.rating_total", err))?,
            rating_count: i64::try_from(movie.rating_count())
                .map_err(|err| corrupt("movies.rating_count", err))?,
            created_at: movie.created_at(),
        })
    }
}

impl TryFrom<MovieRecord> for Movie {
    type Error = GatewayError;

    fn try_from(row: MovieRecord) -> Result<Self, Self::Error> {
        Ok(Movie::restore(MovieSnapshot {
            id: MovieId::from_uuid(row.id),
            title: MovieTitle::new(&row.title).map_err(|err| corrupt("movies.title", err))?,
            rating_total: u64::try_from(row.rating_total)
                .map_err(|err| corrupt("movies.rating_total", err))?,
            rating_count: u64::try_from(row.rating_count)
                .map_err(|err| corrupt("movies.rating_count", err))?,
            created_at: row.created_at,
        }))
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = user_movie_ratings)]
#[diesel(primary_key(user_id, movie_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserMovieRatingRecord {
    pub user_id: Uuid,
    pub movie_id: Uuid,
    pub rating: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&UserMovieRating> for UserMovieRatingRecord {
    fn from(rating: &UserMovieRating) -> Self {
        Self {
            user_id: *rating.user_id().as_uuid(),
            movie_id: *rating.movie_id().as_uuid(),
            rating: i16::from(rating.rating().get()),
            created_at: rating.created_at(),
            updated_at: rating.updated_at(),
        }
    }
}

impl TryFrom<UserMovieRatingRecord> for UserMovieRating {
    type Error = GatewayError;

    fn try_from(row: UserMovieRatingRecord) -> Result<Self, Self::Error> {
        let rating = RatingValue::try_from(i64::from(row.rating))
            .map_err(|err| corrupt("user_movie_ratings.rating", err))?;
        Ok(UserMovieRating::restore(
            UserId::from_uuid(row.user_id),
            MovieId::from_uuid(row.movie_id),
            rating,
            row.created_at,
            row.updated_at,
        ))
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = adding_tasks)]
pub(crate) struct NewAddingTaskRecord {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub adding_type: String,
    pub kinopoisk_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<&AddingTask> for NewAddingTaskRecord {
    fn from(task: &AddingTask) -> Self {
        Self {
            id: *task.id().as_uuid(),
            creator_id: *task.creator_id().as_uuid(),
            adding_type: task.adding_type().as_str().to_owned(),
            kinopoisk_id: task.kinopoisk_id().as_ref().to_owned(),
            status: task.status().as_str().to_owned(),
            created_at: task.created_at(),
        }
    }
}

/// Pending outbox message.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = outbox_messages)]
pub(crate) struct NewOutboxRecord {
    pub id: Uuid,
    pub topic: String,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl NewOutboxRecord {
    pub(crate) fn new(topic: &str, payload: serde_json::Value, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic: topic.to_owned(),
            payload,
            created_at: now,
        }
    }
}
