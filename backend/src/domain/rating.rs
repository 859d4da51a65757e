//! A user's rating of a single movie.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MovieId, UserId};

/// Highest accepted rating.
pub const RATING_MAX: u8 = 10;

/// Returned when a rating falls outside `0..=RATING_MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rating must be between 0 and 10, got {value}")]
pub struct RatingOutOfRange {
    pub value: i64,
}

/// Rating on the `0..=10` scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct RatingValue(u8);

impl RatingValue {
    /// Validate a rating.
    pub fn new(value: u8) -> Result<Self, RatingOutOfRange> {
        if value > RATING_MAX {
            return Err(RatingOutOfRange {
                value: i64::from(value),
            });
        }
        Ok(Self(value))
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for RatingValue {
    type Error = RatingOutOfRange;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| RatingOutOfRange { value })
            .and_then(Self::new)
    }
}

impl From<RatingValue> for u8 {
    fn from(value: RatingValue) -> Self {
        value.0
    }
}

impl std::fmt::Display for RatingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Link between a user and a movie they rated.
///
/// Uniqueness per `(user_id, movie_id)` is enforced by storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMovieRating {
    user_id: UserId,
    movie_id: MovieId,
    rating: RatingValue,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserMovieRating {
    /// Record a first rating.
    pub fn create(
        user_id: UserId,
        movie_id: MovieId,
        rating: RatingValue,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            movie_id,
            rating,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a rating from stored fields.
    pub fn restore(
        user_id: UserId,
        movie_id: MovieId,
        rating: RatingValue,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            movie_id,
            rating,
            created_at,
            updated_at,
        }
    }

    /// Replace the rating value.
    pub fn update(&mut self, rating: RatingValue, now: DateTime<Utc>) {
        self.rating = rating;
        self.updated_at = now;
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn movie_id(&self) -> &MovieId {
        &self.movie_id
    }

    pub fn rating(&self) -> RatingValue {
        self.rating
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
