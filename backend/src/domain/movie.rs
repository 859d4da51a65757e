//! Movie aggregate with its running rating totals.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::RatingValue;

/// Maximum title length in characters.
pub const MOVIE_TITLE_MAX: usize = 255;

/// Validation errors for movie identifiers and titles.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MovieValidationError {
    #[error("movie id must be a valid UUID")]
    InvalidId,
    #[error("movie title must not be empty")]
    EmptyTitle,
    #[error("movie title must be at most {max} characters")]
    TitleTooLong { max: usize },
}

/// Raised when removing a rating the aggregate never counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("movie {movie_id} has no rating of {value} to remove")]
pub struct RatingAggregateUnderflow {
    pub movie_id: MovieId,
    pub value: RatingValue,
}

/// Stable movie identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(Uuid);

impl MovieId {
    /// Parse a [`MovieId`] from its textual UUID form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, MovieValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| MovieValidationError::InvalidId)
    }

    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trimmed, non-empty movie title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MovieTitle(String);

impl MovieTitle {
    /// Validate and construct a title.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, MovieValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(MovieValidationError::EmptyTitle);
        }
        if trimmed.chars().count() > MOVIE_TITLE_MAX {
            return Err(MovieValidationError::TitleTooLong {
                max: MOVIE_TITLE_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for MovieTitle {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<MovieTitle> for String {
    fn from(value: MovieTitle) -> Self {
        value.0
    }
}

impl TryFrom<String> for MovieTitle {
    type Error = MovieValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Plain field bundle used by adapters to rebuild a stored [`Movie`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieSnapshot {
    pub id: MovieId,
    pub title: MovieTitle,
    pub rating_total: u64,
    pub rating_count: u64,
    pub created_at: DateTime<Utc>,
}

/// Catalogued movie.
///
/// ## Invariants
/// - `rating_total` is the sum of every counted rating and `rating_count` the
///   number of them. Both change only through [`Movie::add_rating`] and
///   [`Movie::remove_rating`].
/// - Editing a rating is a remove followed by an add, so the count is stable
///   and the total moves by `new - old`.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use cinerate::domain::{Movie, MovieId, MovieTitle, RatingValue};
///
/// let mut movie = Movie::create(MovieId::random(), MovieTitle::new("Alien").unwrap(), Utc::now());
/// movie.add_rating(RatingValue::new(8).unwrap());
/// movie.add_rating(RatingValue::new(6).unwrap());
/// assert_eq!(movie.rating_count(), 2);
/// assert_eq!(movie.average_rating(), 7.0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movie {
    id: MovieId,
    title: MovieTitle,
    rating_total: u64,
    rating_count: u64,
    created_at: DateTime<Utc>,
}

impl Movie {
    /// Create an unrated movie.
    pub fn create(id: MovieId, title: MovieTitle, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title,
            rating_total: 0,
            rating_count: 0,
            created_at: now,
        }
    }

    /// Rebuild a movie from stored fields.
    pub fn restore(snapshot: MovieSnapshot) -> Self {
        let MovieSnapshot {
            id,
            title,
            rating_total,
            rating_count,
            created_at,
        } = snapshot;
        Self {
            id,
            title,
            rating_total,
            rating_count,
            created_at,
        }
    }

    /// Export all fields for persistence adapters.
    pub fn snapshot(&self) -> MovieSnapshot {
        MovieSnapshot {
            id: self.id,
            title: self.title.clone(),
            rating_total: self.rating_total,
            rating_count: self.rating_count,
            created_at: self.created_at,
        }
    }

    /// Count a new rating.
    pub fn add_rating(&mut self, value: RatingValue) {
        self.rating_total = self.rating_total.saturating_add(u64::from(value.get()));
        self.rating_count = self.rating_count.saturating_add(1);
    }

    /// Withdraw a previously counted rating.
    ///
    /// # Errors
    /// Fails without mutating when the aggregate cannot contain `value`.
    pub fn remove_rating(&mut self, value: RatingValue) -> Result<(), RatingAggregateUnderflow> {
        let underflow = RatingAggregateUnderflow {
            movie_id: self.id,
            value,
        };
        let count = self.rating_count.checked_sub(1).ok_or(underflow)?;
        let total = self
            .rating_total
            .checked_sub(u64::from(value.get()))
            .ok_or(underflow)?;
        self.rating_count = count;
        self.rating_total = total;
        Ok(())
    }

    pub fn id(&self) -> &MovieId {
        &self.id
    }

    pub fn title(&self) -> &MovieTitle {
        &self.title
    }

    /// Sum of all counted ratings.
    pub fn rating_total(&self) -> u64 {
        self.rating_total
    }

    /// Number of counted ratings.
    pub fn rating_count(&self) -> u64 {
        self.rating_count
    }

    /// Mean rating, or `0.0` for an unrated movie.
    #[expect(
        clippy::cast_precision_loss,
        reason = "rating sums stay far below 2^52"
    )]
    pub fn average_rating(&self) -> f64 {
        if self.rating_count == 0 {
            return 0.0;
        }
        self.rating_total as f64 / self.rating_count as f64
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
